use log::{debug, info};
use spaserve::{log_error, log_request, log_response};
use spaserve::{Body, Request, Response, StaticServer};
use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crate::args::Args;

pub fn start_server(args: Args) -> io::Result<()> {
    let engine = StaticServer::new(&args.serve_dir, args.to_options())
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    let engine = Arc::new(engine);

    let listener = TcpListener::bind(&args.listen_addr)?;
    info!("Listening on: {}", args.listen_addr);
    info!("Serving directory: {}", engine.root().display());

    for stream in listener.incoming() {
        let stream = stream?;
        let engine = Arc::clone(&engine);

        thread::spawn(move || {
            if let Err(e) = handle_connection(stream, &engine) {
                log_error!(e, "Error handling connection");
            }
        });
    }

    Ok(())
}

fn handle_connection(client: TcpStream, engine: &StaticServer) -> io::Result<()> {
    let mut buf_reader = BufReader::new(&client);
    let mut first_line = String::new();
    buf_reader.read_line(&mut first_line)?;

    let mut parts = first_line.split_whitespace();
    let (Some(method), Some(target)) = (parts.next(), parts.next()) else {
        debug!("Invalid request line: {}", first_line.trim());
        return Ok(());
    };
    log_request!(method, target);

    let mut request = Request::new(method, target);
    let mut line = String::new();
    while {
        line.clear();
        buf_reader.read_line(&mut line)?;
        !line.trim().is_empty()
    } {
        debug!("Header line: {}", line.trim());
        if let Some((name, value)) = line.split_once(':') {
            request.headers.set(name.trim(), value.trim());
        }
    }

    let start_time = Instant::now();
    let response = match method {
        "GET" | "HEAD" => engine.handle(&request),
        _ => {
            let mut response = Response::new(405);
            response.headers.set("Allow", "GET, HEAD");
            response.headers.set("Content-Length", "0");
            response
        }
    };

    let body_size = write_response(&client, &response, method == "HEAD")?;
    log_response!(response.status, start_time.elapsed(), body_size);
    Ok(())
}

fn write_response(mut client: &TcpStream, response: &Response, head_only: bool) -> io::Result<u64> {
    let reason = match response.status {
        405 => "Method Not Allowed",
        _ => response.reason(),
    };
    client.write_all(format!("HTTP/1.1 {} {}\r\n", response.status, reason).as_bytes())?;
    for (key, value) in response.headers.iter() {
        client.write_all(format!("{}: {}\r\n", key, value).as_bytes())?;
    }
    client.write_all(b"Connection: close\r\n")?;
    client.write_all(b"\r\n")?;

    if head_only {
        return Ok(0);
    }

    match &response.body {
        Body::Empty => Ok(0),
        Body::Bytes(bytes) => {
            client.write_all(bytes)?;
            Ok(bytes.len() as u64)
        }
        // The file handle lives only as long as this copy.
        Body::File(file) => io::copy(&mut file.open()?, &mut client),
    }
}
