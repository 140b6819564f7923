// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, FixedOffset};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use url::Url;

use crate::error::OpmlError;

/// A podcast feed entry from the export
#[derive(Debug, Clone)]
pub struct Podcast {
    pub title: String,
    pub feed_url: Option<Url>,
    pub episodes: Vec<Episode>,
}

/// A single episode outline from the export
#[derive(Debug, Clone)]
pub struct Episode {
    pub title: String,
    pub pub_date: Option<DateTime<FixedOffset>>,
    pub enclosure_url: Url,
    pub played: bool,
    pub overcast_id: Option<String>,
    pub overcast_url: Option<String>,
}

/// Which role an `<outline>` element plays in the export.
///
/// Overcast nests episode outlines inside their podcast outline, and wraps
/// the whole list in structural outlines ("playlists", "feeds") that carry
/// no data of their own.
enum OutlineKind {
    Podcast,
    Episode,
    Structural,
}

/// Parse an Overcast OPML export into its podcasts and episodes.
///
/// Episode order is preserved exactly as written in the export
/// (Overcast emits newest-first).
pub fn parse_export(xml: &str) -> Result<Vec<Podcast>, OpmlError> {
    let mut reader = Reader::from_str(xml);

    let mut podcasts: Vec<Podcast> = Vec::new();
    let mut current: Option<Podcast> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"outline" => match outline_kind(&e)? {
                OutlineKind::Podcast => {
                    if let Some(done) = current.take() {
                        podcasts.push(done);
                    }
                    current = Some(podcast_from_outline(&e)?);
                }
                OutlineKind::Episode => {
                    if let Some(podcast) = current.as_mut() {
                        podcast.episodes.push(episode_from_outline(&e)?);
                    }
                }
                OutlineKind::Structural => {}
            },
            Event::Empty(e) if e.name().as_ref() == b"outline" => match outline_kind(&e)? {
                OutlineKind::Podcast => {
                    if let Some(done) = current.take() {
                        podcasts.push(done);
                    }
                    // Self-closing podcast outline: no episodes listed
                    podcasts.push(podcast_from_outline(&e)?);
                }
                OutlineKind::Episode => {
                    if let Some(podcast) = current.as_mut() {
                        podcast.episodes.push(episode_from_outline(&e)?);
                    }
                }
                OutlineKind::Structural => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(done) = current.take() {
        podcasts.push(done);
    }

    Ok(podcasts)
}

fn outline_kind(e: &BytesStart) -> Result<OutlineKind, OpmlError> {
    Ok(match attr_value(e, "type")?.as_deref() {
        Some("rss") => OutlineKind::Podcast,
        Some("podcast-episode") => OutlineKind::Episode,
        _ => OutlineKind::Structural,
    })
}

fn podcast_from_outline(e: &BytesStart) -> Result<Podcast, OpmlError> {
    // Overcast writes the podcast name to both "title" and "text";
    // older exports only carry "text"
    let title = match attr_value(e, "title")? {
        Some(title) => title,
        None => attr_value(e, "text")?.ok_or(OpmlError::MissingAttribute {
            outline: "rss".to_string(),
            attribute: "title",
        })?,
    };

    let feed_url = attr_value(e, "xmlUrl")?.and_then(|u| Url::parse(&u).ok());

    Ok(Podcast {
        title,
        feed_url,
        episodes: Vec::new(),
    })
}

fn episode_from_outline(e: &BytesStart) -> Result<Episode, OpmlError> {
    let title = attr_value(e, "title")?.ok_or(OpmlError::MissingAttribute {
        outline: "podcast-episode".to_string(),
        attribute: "title",
    })?;

    let enclosure = attr_value(e, "enclosureUrl")?.ok_or_else(|| OpmlError::MissingAttribute {
        outline: title.clone(),
        attribute: "enclosureUrl",
    })?;

    let enclosure_url =
        Url::parse(&enclosure).map_err(|source| OpmlError::InvalidEnclosureUrl {
            title: title.clone(),
            url: enclosure.clone(),
            source,
        })?;

    // pubDate is RFC 3339 in Overcast exports; anything else degrades to None
    let pub_date =
        attr_value(e, "pubDate")?.and_then(|d| DateTime::parse_from_rfc3339(&d).ok());

    // played="1" means listened; "0", anything else, or absent means unplayed
    let played = attr_value(e, "played")?.as_deref() == Some("1");

    Ok(Episode {
        title,
        pub_date,
        enclosure_url,
        played,
        overcast_id: attr_value(e, "overcastId")?,
        overcast_url: attr_value(e, "overcastUrl")?,
    })
}

fn attr_value(e: &BytesStart, name: &str) -> Result<Option<String>, OpmlError> {
    match e.try_get_attribute(name)? {
        Some(attr) => Ok(Some(attr.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_EXPORT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<opml version="1.0">
  <head><title>Overcast Podcast Subscriptions</title></head>
  <body>
    <outline text="playlists">
      <outline type="podcast-playlist" title="All" text="All"/>
    </outline>
    <outline text="feeds">
      <outline type="rss"
               title="My Example Podcast"
               text="My Example Podcast"
               xmlUrl="https://example.org/podcast.xml">
        <outline type="podcast-episode"
                 overcastId="12345"
                 pubDate="2001-01-01T01:01:01-00:00"
                 title="The first episode"
                 url="https://example.net/podcast/1"
                 overcastUrl="https://overcast.fm/+ABCDE"
                 enclosureUrl="https://example.net/files/1.mp3"
                 played="1"/>
        <outline type="podcast-episode"
                 overcastId="12346"
                 pubDate="2001-02-01T01:01:01-00:00"
                 title="The second episode"
                 enclosureUrl="https://example.net/files/2.mp3"
                 played="0"/>
      </outline>
      <outline type="rss"
               title="Another Show"
               xmlUrl="https://example.com/another.xml">
        <outline type="podcast-episode"
                 title="Pilot"
                 enclosureUrl="https://example.com/pilot.mp3"/>
      </outline>
    </outline>
  </body>
</opml>"#;

    #[test]
    fn parse_export_groups_episodes_under_podcasts() {
        let podcasts = parse_export(SAMPLE_EXPORT).unwrap();

        assert_eq!(podcasts.len(), 2);
        assert_eq!(podcasts[0].title, "My Example Podcast");
        assert_eq!(podcasts[0].episodes.len(), 2);
        assert_eq!(podcasts[1].title, "Another Show");
        assert_eq!(podcasts[1].episodes.len(), 1);
    }

    #[test]
    fn parse_export_preserves_episode_order() {
        let podcasts = parse_export(SAMPLE_EXPORT).unwrap();

        let titles: Vec<_> = podcasts[0]
            .episodes
            .iter()
            .map(|e| e.title.as_str())
            .collect();
        assert_eq!(titles, vec!["The first episode", "The second episode"]);
    }

    #[test]
    fn parse_export_extracts_episode_attributes() {
        let podcasts = parse_export(SAMPLE_EXPORT).unwrap();

        let ep = &podcasts[0].episodes[0];
        assert_eq!(
            ep.enclosure_url.as_str(),
            "https://example.net/files/1.mp3"
        );
        assert_eq!(ep.overcast_id.as_deref(), Some("12345"));
        assert_eq!(ep.overcast_url.as_deref(), Some("https://overcast.fm/+ABCDE"));
        assert_eq!(
            ep.pub_date.unwrap().format("%Y-%m-%d").to_string(),
            "2001-01-01"
        );
    }

    #[test]
    fn played_flag_maps_export_convention() {
        let podcasts = parse_export(SAMPLE_EXPORT).unwrap();

        assert!(podcasts[0].episodes[0].played);
        assert!(!podcasts[0].episodes[1].played);
        // absent played attribute means unplayed
        assert!(!podcasts[1].episodes[0].played);
    }

    #[test]
    fn podcast_feed_url_is_parsed() {
        let podcasts = parse_export(SAMPLE_EXPORT).unwrap();

        assert_eq!(
            podcasts[0].feed_url.as_ref().unwrap().as_str(),
            "https://example.org/podcast.xml"
        );
    }

    #[test]
    fn structural_outlines_are_ignored() {
        let podcasts = parse_export(SAMPLE_EXPORT).unwrap();

        // "playlists", "feeds" and "podcast-playlist" outlines never show up
        assert!(podcasts.iter().all(|p| p.title != "playlists"));
        assert!(podcasts.iter().all(|p| p.title != "All"));
    }

    #[test]
    fn podcast_title_falls_back_to_text() {
        let xml = r#"<opml version="1.0"><body>
            <outline type="rss" text="Text Only Show" xmlUrl="https://example.org/f.xml"/>
        </body></opml>"#;

        let podcasts = parse_export(xml).unwrap();
        assert_eq!(podcasts.len(), 1);
        assert_eq!(podcasts[0].title, "Text Only Show");
        assert!(podcasts[0].episodes.is_empty());
    }

    #[test]
    fn missing_enclosure_url_is_an_error() {
        let xml = r#"<opml version="1.0"><body>
            <outline type="rss" title="Show">
                <outline type="podcast-episode" title="No Audio"/>
            </outline>
        </body></opml>"#;

        let err = parse_export(xml).unwrap_err();
        match err {
            OpmlError::MissingAttribute { outline, attribute } => {
                assert_eq!(outline, "No Audio");
                assert_eq!(attribute, "enclosureUrl");
            }
            other => panic!("Expected MissingAttribute, got {other:?}"),
        }
    }

    #[test]
    fn invalid_enclosure_url_is_an_error() {
        let xml = r#"<opml version="1.0"><body>
            <outline type="rss" title="Show">
                <outline type="podcast-episode" title="Bad URL" enclosureUrl="not a url"/>
            </outline>
        </body></opml>"#;

        assert!(matches!(
            parse_export(xml).unwrap_err(),
            OpmlError::InvalidEnclosureUrl { .. }
        ));
    }

    #[test]
    fn malformed_xml_is_an_error() {
        let xml = "<opml><body><outline type=\"rss\" title=\"Show\"></wrong></body></opml>";
        assert!(parse_export(xml).is_err());
    }

    #[test]
    fn unparseable_pub_date_degrades_to_none() {
        let xml = r#"<opml version="1.0"><body>
            <outline type="rss" title="Show">
                <outline type="podcast-episode" title="Ep"
                         pubDate="sometime last week"
                         enclosureUrl="https://example.org/ep.mp3"/>
            </outline>
        </body></opml>"#;

        let podcasts = parse_export(xml).unwrap();
        assert!(podcasts[0].episodes[0].pub_date.is_none());
    }

    #[test]
    fn entity_escaped_titles_are_unescaped() {
        let xml = r#"<opml version="1.0"><body>
            <outline type="rss" title="Q &amp; A">
                <outline type="podcast-episode" title="Cats &amp; Dogs"
                         enclosureUrl="https://example.org/ep.mp3"/>
            </outline>
        </body></opml>"#;

        let podcasts = parse_export(xml).unwrap();
        assert_eq!(podcasts[0].title, "Q & A");
        assert_eq!(podcasts[0].episodes[0].title, "Cats & Dogs");
    }
}
