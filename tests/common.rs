use image::{Rgb, RgbImage};
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

/// Palette PNG without metadata, as Tinify returns it
pub fn create_tiny_png(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, tiny_png_bytes()).unwrap();
    path
}

pub fn tiny_png_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut bytes, 2, 2);
        encoder.set_color(png::ColorType::Indexed);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_palette(vec![0, 0, 0, 255, 255, 255]);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(&[0, 1, 1, 0]).unwrap();
        writer.finish().unwrap();
    }
    bytes
}

pub fn create_rgb_image(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(8, 8, Rgb([120, 40, 200]))
        .save(&path)
        .unwrap();
    path
}

/// Serves one Tinify shrink exchange (POST then GET) on localhost.
///
/// Returns the endpoint URL and a handle yielding the raw POST request.
pub fn spawn_tinify_stub(output: Vec<u8>) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let post = read_request(&mut stream);
        write!(
            stream,
            "HTTP/1.1 201 Created\r\nLocation: /output/abc\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
        )
        .unwrap();
        drop(stream);

        let (mut stream, _) = listener.accept().unwrap();
        read_request(&mut stream);
        write!(
            stream,
            "HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            output.len()
        )
        .unwrap();
        stream.write_all(&output).unwrap();
        post
    });

    (format!("http://{}/shrink", addr), handle)
}

fn read_request(stream: &mut std::net::TcpStream) -> String {
    let mut reader = BufReader::new(stream);
    let mut head = String::new();
    let mut content_length = 0;

    loop {
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
            content_length = value.trim().parse().unwrap();
        }
        let done = line == "\r\n" || line.is_empty();
        head.push_str(&line);
        if done {
            break;
        }
    }

    let mut body = vec![0; content_length];
    reader.read_exact(&mut body).unwrap();
    head
}

pub fn write_settings(dir: &Path, endpoint: &str) -> PathBuf {
    let path = dir.join("settings.json");
    let mut file = File::create(&path).unwrap();
    write!(file, r#"{{ "endpoint": "{}", "workers": 2, "max_uploads": 1 }}"#, endpoint).unwrap();
    path
}
