//! Upload Demo
//!
//! Streams a local video file to the media API without buffering it.
//!
//! Usage: `upload-video-demo <token> <path> [name]`

// Demo-specific lint allowances
#![allow(missing_docs)]
#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]

use reel::prelude::*;

#[tokio::main]
async fn main() -> reel::Result<()> {
    let mut args = std::env::args().skip(1);
    let (Some(token), Some(path)) = (args.next(), args.next()) else {
        eprintln!("usage: upload-video-demo <token> <path> [name]");
        return Ok(());
    };
    let name = args.next().unwrap_or_else(|| path.clone());

    let mut client = MediaClient::new(token)?;
    client.set_timeout(300);

    println!("Uploading {path} as {name:?}...");

    let response = client
        .post_file_streaming(
            "create_video",
            &path,
            "video/quicktime",
            Params::new().with("video", Params::new().with("name", name)),
        )
        .await?;

    let result: serde_json::Value = response.json()?;
    match result.get("error") {
        Some(error) if !error.is_null() => println!("Upload failed: {error}"),
        _ => println!(
            "Created media id: {}",
            result.get("result").unwrap_or(&serde_json::Value::Null)
        ),
    }

    Ok(())
}
