//! Turns an image reference into the style applied to the thumbnail holder.

use crate::resolver::{directory_of, is_fully_qualified, resolve};

use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleDescriptor {
    /// The whole image, at whatever size the holder has.
    FullImage { url: String },
    /// A `width` x `height` tile cut out of a sprite sheet at (`x`, `y`).
    Sprite {
        url: String,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}

impl StyleDescriptor {
    pub fn background(&self) -> String {
        match self {
            StyleDescriptor::FullImage { url } => format!("url(\"{}\")", url),
            StyleDescriptor::Sprite { url, x, y, .. } => {
                format!("url(\"{}\") no-repeat -{}px -{}px", url, x, y)
            }
        }
    }

    pub fn width(&self) -> Option<u32> {
        match self {
            StyleDescriptor::FullImage { .. } => None,
            StyleDescriptor::Sprite { width, .. } => Some(*width),
        }
    }

    pub fn height(&self) -> Option<u32> {
        match self {
            StyleDescriptor::FullImage { .. } => None,
            StyleDescriptor::Sprite { height, .. } => Some(*height),
        }
    }

    /// Key for the image preload cache. Only sprite tiles carry one.
    pub fn preload_url(&self) -> Option<&str> {
        match self {
            StyleDescriptor::FullImage { .. } => None,
            StyleDescriptor::Sprite { url, .. } if !url.is_empty() => Some(url.as_str()),
            StyleDescriptor::Sprite { .. } => None,
        }
    }

    pub fn css_properties(&self) -> Vec<(&'static str, String)> {
        let mut props = vec![("background", self.background())];
        if let StyleDescriptor::Sprite {
            url, width, height, ..
        } = self
        {
            props.push(("width", format!("{}px", width)));
            props.push(("height", format!("{}px", height)));
            props.push(("url", url.clone()));
        }
        props
    }

    /// The reference this style was built from, with the region fragment restored.
    pub fn reference(&self) -> String {
        match self {
            StyleDescriptor::FullImage { url } => url.clone(),
            StyleDescriptor::Sprite {
                url,
                x,
                y,
                width,
                height,
            } => format!("{}#xywh={},{},{},{}", url, x, y, width, height),
        }
    }
}

impl Serialize for StyleDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let props = self.css_properties();
        let mut map = serializer.serialize_map(Some(props.len()))?;
        for (name, value) in &props {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpriteError {
    /// The `#xywh=` fragment does not hold four numbers that fit a pixel value.
    MalformedRegion(String),
}

pub struct SpriteResolver {
    fragment: Regex,
    digits: Regex,
}

impl SpriteResolver {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            fragment: Regex::new(r"(?i)#xywh=")?,
            digits: Regex::new(r"\d+")?,
        })
    }

    /// If the cue source is itself fully qualified its own directory is the
    /// base, otherwise the page base is prepended to that directory.
    pub fn resolve_style(
        &self,
        image_ref: &str,
        cue_source: &str,
        page_base: &str,
    ) -> Result<StyleDescriptor, SpriteError> {
        let base = if is_fully_qualified(cue_source) {
            directory_of(cue_source).to_string()
        } else {
            format!("{}{}", page_base, directory_of(cue_source))
        };
        let resolved = resolve(image_ref.trim(), &base);

        let mut parts = self.fragment.splitn(&resolved, 2);
        let image = parts.next().unwrap_or("");
        let coords = match parts.next() {
            Some(coords) => coords,
            None => return Ok(StyleDescriptor::FullImage { url: resolved }),
        };

        // A run too large for a pixel value makes the region unusable.
        let numbers: Option<Vec<u32>> = self
            .digits
            .find_iter(coords)
            .take(4)
            .map(|m| m.as_str().parse().ok())
            .collect();
        match numbers.as_deref().unwrap_or(&[]) {
            &[x, y, width, height] => Ok(StyleDescriptor::Sprite {
                url: image.to_string(),
                x,
                y,
                width,
                height,
            }),
            _ => Err(SpriteError::MalformedRegion(resolved)),
        }
    }
}
