use anyhow::{ensure, Context, Result};
use url::Url;

const PERMALINK_PREFIX: &str = "Permanent link to this comic:";
const IMAGE_PREFIX: &str = "Image URL (for hotlinking/embedding):";

/// One comic resolved from its page markup.
#[derive(Debug, PartialEq, Eq)]
pub struct ComicRecord {
    pub number: u32,
    pub page_url: String,
    pub image_url: String,
    pub original_file_name: String,
}

impl ComicRecord {
    /// Extracts a comic from its page by scanning for the permanent-link and
    /// image-URL marker lines. Errors whenever the comic number or the image
    /// file name cannot be resolved.
    pub fn from_page(page_url: &str, body: &str) -> Result<Self> {
        let mut number = None;
        let mut image_url = None;

        for line in body.lines() {
            if let Some(value) = line.strip_prefix(PERMALINK_PREFIX) {
                number = Some(parse_number(clean_value(value))?);
            } else if let Some(value) = line.strip_prefix(IMAGE_PREFIX) {
                // The image line follows the permanent link on comic pages
                image_url = Some(clean_value(value).to_string());
                break;
            }
        }

        let number = number.with_context(|| format!("{page_url} has no permanent link line"))?;
        let image_url = image_url.with_context(|| format!("{page_url} has no image URL line"))?;
        let original_file_name = image_file_name(&image_url)?;

        Ok(Self {
            number,
            page_url: page_url.to_string(),
            image_url,
            original_file_name,
        })
    }

    /// Local file name for the downloaded image.
    pub fn file_name(&self) -> String {
        format!("{}_{}", self.number, self.original_file_name)
    }
}

// Marker values are plain text but may keep a trailing `<br />` from the page.
fn clean_value(raw: &str) -> &str {
    let value = raw.trim();
    match value.strip_suffix("<br />") {
        Some(stripped) => stripped.trim_end(),
        None => value,
    }
}

fn parse_number(permalink: &str) -> Result<u32> {
    let segment = permalink
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    let number: u32 = segment
        .parse()
        .with_context(|| format!("permanent link {permalink} does not end in a comic number"))?;
    ensure!(number > 0, "comic number in {permalink} must be positive");
    Ok(number)
}

fn image_file_name(image_url: &str) -> Result<String> {
    let url = Url::parse(image_url).with_context(|| format!("invalid image URL {image_url}"))?;
    let name = url.path_segments().and_then(|s| s.last()).unwrap_or_default();
    ensure!(!name.is_empty(), "image URL {image_url} has no file name");
    Ok(name.to_string())
}
