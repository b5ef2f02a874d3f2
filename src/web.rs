use std::path::Path;
use std::time::Duration;
use tracing::{debug, span, Level};
use url::Url;

use crate::Error;

const TIMEOUT: Duration = Duration::from_secs(30);

/// Fetch a markup document from an http(s) URL, a `file:` URL or a plain path
pub fn get_text_resource(input: &str) -> Result<String, Error> {
    let span = span!(Level::DEBUG, "Loading resource", resource = input);
    let _enter = span.enter();
    match Url::parse(input) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => get_remote(url),
        Ok(url) if url.scheme() == "file" => {
            let path = url.to_file_path().map_err(|_| Error::Io {
                path: url.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "not a local file URL",
                ),
            })?;
            read_file(&path)
        }
        // Bare paths and anything with an unknown scheme (e.g. `C:\...`)
        _ => read_file(Path::new(input)),
    }
}

fn get_remote(url: Url) -> Result<String, Error> {
    let client = reqwest::blocking::Client::builder()
        .timeout(TIMEOUT)
        .build()?;
    let resp = client.get(url).send()?.error_for_status()?;
    debug!(status = %resp.status(), "Fetched remote resource");
    Ok(resp.text()?)
}

fn read_file(path: &Path) -> Result<String, Error> {
    std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
#[test]
fn test_read_local_file() {
    let path = std::env::temp_dir().join(format!("nodesift-web-{}.html", std::process::id()));
    std::fs::write(&path, "<p>local</p>").unwrap();

    let text = get_text_resource(path.to_str().unwrap()).unwrap();
    assert_eq!(text, "<p>local</p>");

    let url = Url::from_file_path(&path).unwrap();
    let text = get_text_resource(url.as_str()).unwrap();
    assert_eq!(text, "<p>local</p>");

    std::fs::remove_file(&path).unwrap();
}

#[cfg(test)]
#[test]
fn test_missing_file() {
    let err = get_text_resource("/definitely/not/here.html").unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
    assert!(err.to_string().contains("/definitely/not/here.html"));
}
