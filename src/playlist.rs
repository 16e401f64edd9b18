//! Playlist format detection and parsing.

use anyhow::{Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::model::Track;

/// Playlist formats recognized by their file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Pls,
    M3u,
    Asx,
}

impl Format {
    /// Detect a playlist format from an entry's extension.
    ///
    /// Matching is case-insensitive and ignores any query-string suffix, so
    /// `http://radio.example/live.PLS?id=1` is recognized as pls.
    pub fn detect(entry: &str) -> Option<Format> {
        match extension(entry)?.as_str() {
            "pls" => Some(Format::Pls),
            "m3u" => Some(Format::M3u),
            "asx" => Some(Format::Asx),
            _ => None,
        }
    }

    /// Parse playlist text into the tracks it references, in document order.
    pub fn parse(self, text: &str) -> Result<Vec<Track>> {
        match self {
            Format::Pls => parse_pls(text),
            Format::M3u => Ok(parse_m3u(text)),
            Format::Asx => parse_asx(text),
        }
    }
}

/// The extension token of an entry: taken from the last path component with
/// trailing slashes ignored, cut at the first `?`, lowercased. Dotless and
/// leading-dot names have no extension.
fn extension(entry: &str) -> Option<String> {
    let name = entry
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(entry);
    let dot = name.rfind('.')?;
    if dot == 0 {
        return None;
    }
    let ext = name[dot + 1..].split('?').next().unwrap_or("");
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_ascii_lowercase())
    }
}

fn parse_pls(text: &str) -> Result<Vec<Track>> {
    let mut bytes = text.as_bytes();
    let entries = pls::parse(&mut bytes).context("Failed parsing pls playlist")?;
    Ok(entries
        .into_iter()
        .map(|entry| Track::new(entry.path))
        .collect())
}

/// M3U is a plain list of references, one per line. Lines starting with `#`
/// are comments or EXTINF directives carrying nothing we need.
fn parse_m3u(text: &str) -> Vec<Track> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(Track::new)
        .collect()
}

/// ASX is XML where every `<ref href="..."/>` names a stream. Tag and
/// attribute casing varies in the wild (`Ref`, `REF`, `HREF`), so the scan
/// ignores ASCII case and accepts self-closing as well as paired tags.
fn parse_asx(text: &str) -> Result<Vec<Track>> {
    let mut reader = Reader::from_str(text);
    let mut tracks = Vec::new();
    loop {
        match reader.read_event().context("Failed parsing asx playlist")? {
            Event::Start(tag) | Event::Empty(tag) => {
                if tag.name().as_ref().eq_ignore_ascii_case(b"ref") {
                    if let Some(href) = href_attribute(&tag)? {
                        tracks.push(Track::new(href));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(tracks)
}

fn href_attribute(tag: &BytesStart) -> Result<Option<String>> {
    for attribute in tag.attributes() {
        let attribute = attribute.context("Failed parsing asx attribute")?;
        if attribute.key.as_ref().eq_ignore_ascii_case(b"href") {
            let value = attribute
                .unescape_value()
                .context("Failed unescaping asx href")?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}
