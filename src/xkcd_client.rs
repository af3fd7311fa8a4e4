use crate::models::ComicRecord;
use anyhow::{ensure, Context, Result};
use log::debug;
use reqwest::Client;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Shared HTTP client. The request timeout covers both page and image fetches
/// so a hung connection cannot stall a whole batch.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .build()
        .context("unable to build HTTP client")
}

/// Fetches a comic page and extracts its record. The body is only parsed for
/// 2xx responses.
pub async fn fetch_comic(client: &Client, page_url: &str) -> Result<ComicRecord> {
    let response = client
        .get(page_url)
        .send()
        .await
        .with_context(|| format!("request for {page_url} failed"))?;
    let status = response.status();
    ensure!(status.is_success(), "{page_url} returned {status}");

    let body = response
        .text()
        .await
        .with_context(|| format!("unable to read body of {page_url}"))?;
    ComicRecord::from_page(page_url, &body)
}

/// Downloads a comic's image into `directory` under its local file name.
pub async fn download_image(
    client: &Client,
    comic: &ComicRecord,
    directory: &Path,
) -> Result<PathBuf> {
    let response = client
        .get(&comic.image_url)
        .send()
        .await
        .with_context(|| format!("request for {} failed", comic.image_url))?;
    let status = response.status();
    ensure!(status.is_success(), "{} returned {status}", comic.image_url);

    let bytes = response
        .bytes()
        .await
        .with_context(|| format!("unable to read image body of {}", comic.image_url))?;

    let target = directory.join(comic.file_name());
    fs::write(&target, &bytes).with_context(|| format!("unable to write {}", target.display()))?;
    debug!("Wrote {} ({} bytes)", target.display(), bytes.len());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_comic(image_url: String) -> ComicRecord {
        ComicRecord {
            number: 614,
            page_url: "https://xkcd.com/614/".to_string(),
            image_url,
            original_file_name: "woodpecker.png".to_string(),
        }
    }

    #[test]
    fn builds_a_client() {
        assert!(build_client(Duration::from_secs(30)).is_ok());
    }

    #[tokio::test]
    async fn fetch_comic_parses_the_page() {
        let server = MockServer::start().await;
        let body = format!(
            "<html>\nPermanent link to this comic: {0}/614/\nImage URL (for hotlinking/embedding): {0}/comics/woodpecker.png\n</html>\n",
            server.uri()
        );
        Mock::given(method("GET"))
            .and(path("/614/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let client = Client::new();
        let page_url = format!("{}/614/", server.uri());
        let comic = fetch_comic(&client, &page_url).await.unwrap();

        assert_eq!(614, comic.number);
        assert_eq!(page_url, comic.page_url);
        assert_eq!("614_woodpecker.png", comic.file_name());
    }

    #[tokio::test]
    async fn fetch_comic_fails_on_a_missing_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = Client::new();
        let result = fetch_comic(&client, &format!("{}/0/", server.uri())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn download_image_writes_the_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/comics/woodpecker.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png bytes".to_vec()))
            .mount(&server)
            .await;
        let dir = TempDir::new().unwrap();
        let comic = test_comic(format!("{}/comics/woodpecker.png", server.uri()));

        let client = Client::new();
        let target = download_image(&client, &comic, dir.path()).await.unwrap();

        assert_eq!(dir.path().join("614_woodpecker.png"), target);
        assert_eq!(b"png bytes".to_vec(), fs::read(&target).unwrap());
    }

    #[tokio::test]
    async fn download_image_fails_on_a_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let dir = TempDir::new().unwrap();
        let comic = test_comic(format!("{}/comics/woodpecker.png", server.uri()));

        let result = download_image(&Client::new(), &comic, dir.path()).await;

        assert!(result.is_err());
        assert!(!dir.path().join("614_woodpecker.png").exists());
    }
}
