#[cfg(test)]
use crate::api::models::ModelCatalog;
#[cfg(test)]
use crate::core::app::App;
#[cfg(test)]
use crate::core::transcript::Transcript;
#[cfg(test)]
use crate::utils::logging::LoggingState;
#[cfg(test)]
use tokio::io::AsyncReadExt;
#[cfg(test)]
use tokio::net::TcpStream;

#[cfg(test)]
pub fn create_test_app() -> App {
    App {
        transcript: Transcript::new("You are a test assistant."),
        input: String::new(),
        client: reqwest::Client::new(),
        model: "gemma3:270m".to_string(),
        base_url: "http://localhost:8000".to_string(),
        catalog: ModelCatalog::fallback(),
        logging: LoggingState::new(None).unwrap(),
        scroll_offset: 0,
        auto_scroll: true,
        is_streaming: false,
        pulse_start: std::time::Instant::now(),
        stream_cancel_token: None,
        current_stream_id: 0,
        open_turn: None,
    }
}

/// Read one HTTP request from a raw socket: the request line, the headers,
/// and exactly `Content-Length` bytes of body. Mock gateway servers in
/// tests use this before writing a hand-crafted response.
#[cfg(test)]
pub async fn read_http_request(
    stream: &mut TcpStream,
) -> Result<(String, Vec<(String, String)>, Vec<u8>), String> {
    let mut buffer: Vec<u8> = Vec::new();
    let mut header_end = None;
    while header_end.is_none() {
        let mut chunk = [0_u8; 1024];
        let read = stream
            .read(&mut chunk)
            .await
            .map_err(|err| err.to_string())?;
        if read == 0 {
            return Err("Unexpected EOF while reading HTTP headers".to_string());
        }
        buffer.extend_from_slice(&chunk[..read]);
        header_end = buffer
            .windows(4)
            .position(|window| window == b"\r\n\r\n")
            .map(|index| index + 4);
    }

    let header_end = header_end.ok_or("header end should exist")?;
    let header_text =
        std::str::from_utf8(&buffer[..header_end]).map_err(|err| err.to_string())?;
    let mut lines = header_text.split("\r\n").filter(|line| !line.is_empty());
    let request_line = lines
        .next()
        .ok_or_else(|| "Missing HTTP request line".to_string())?
        .to_string();

    let mut headers = Vec::new();
    let mut content_length = 0_usize;
    for line in lines {
        let mut parts = line.splitn(2, ':');
        let Some(name) = parts.next() else {
            continue;
        };
        let value = parts.next().unwrap_or_default().trim().to_string();
        if name.eq_ignore_ascii_case("content-length") {
            content_length = value.parse::<usize>().map_err(|err| err.to_string())?;
        }
        headers.push((name.to_string(), value));
    }

    let mut body = buffer[header_end..].to_vec();
    while body.len() < content_length {
        let mut chunk = vec![0_u8; content_length.saturating_sub(body.len())];
        let read = stream
            .read(&mut chunk)
            .await
            .map_err(|err| err.to_string())?;
        if read == 0 {
            return Err("Unexpected EOF while reading HTTP body".to_string());
        }
        body.extend_from_slice(&chunk[..read]);
    }
    body.truncate(content_length);

    Ok((request_line, headers, body))
}
