use std::io::{self, Cursor, Write};
use std::sync::{Arc, Mutex};

use image::{ImageBuffer, ImageFormat, Rgba};
use mockito::{Matcher, Server};

use imagesearch::bootstrap::wire_services;
use imagesearch::cli::browse;
use search_core::config::{ProviderConfig, SearchConfig};

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuf {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

fn envelope(base: &str, start: u32, next: Option<u32>) -> String {
    let next = next
        .map(|n| format!(r#","nextPage":[{{"totalResults":"20","count":10,"startIndex":{n}}}]"#))
        .unwrap_or_default();
    let items: Vec<String> = (start..start + 10)
        .map(|n| {
            format!(
                r#"{{"title":"panda {n}","link":"{base}/full/{n}.png","image":{{"thumbnailLink":"{base}/thumb/{n}.png"}}}}"#
            )
        })
        .collect();
    format!(
        r#"{{"queries":{{"request":[{{"totalResults":"20","count":10,"startIndex":{start}}}]{next}}},"items":[{}]}}"#,
        items.join(",")
    )
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let buffer = ImageBuffer::from_pixel(width, height, Rgba([0u8, 128, 0, 255]));
    let mut out = Cursor::new(Vec::new());
    buffer.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

fn config(server: &Server) -> SearchConfig {
    SearchConfig {
        provider: ProviderConfig {
            endpoint: format!("{}/customsearch/v1", server.url()),
            api_key: "test-key".to_string(),
            engine_id: "test-cx".to_string(),
            ..ProviderConfig::default()
        },
        ..SearchConfig::default()
    }
}

#[tokio::test]
async fn test_browse_pages_and_downloads_thumbnails() {
    let mut server = Server::new_async().await;
    let base = server.url();

    let first = server
        .mock("GET", "/customsearch/v1")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "red panda".into()),
            Matcher::UrlEncoded("start".into(), "1".into()),
            Matcher::UrlEncoded("key".into(), "test-key".into()),
            Matcher::UrlEncoded("cx".into(), "test-cx".into()),
            Matcher::UrlEncoded("searchType".into(), "image".into()),
        ]))
        .with_status(200)
        .with_body(envelope(&base, 1, Some(11)))
        .expect(1)
        .create_async()
        .await;
    let second = server
        .mock("GET", "/customsearch/v1")
        .match_query(Matcher::UrlEncoded("start".into(), "11".into()))
        .with_status(200)
        .with_body(envelope(&base, 11, None))
        .expect(1)
        .create_async()
        .await;
    let thumbs = server
        .mock("GET", Matcher::Regex(r"^/thumb/\d+\.png$".to_string()))
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(png(4, 3))
        .expect(2)
        .create_async()
        .await;

    let services = wire_services(&config(&server)).unwrap();
    let out = SharedBuf::default();
    // Asking for more pages than exist stops at the last one.
    browse(&services, "red panda", 5, 2, out.clone()).await.unwrap();

    first.assert_async().await;
    second.assert_async().await;
    thumbs.assert_async().await;

    let text = out.text();
    assert!(text.contains("== 10 results"), "{text}");
    assert!(text.contains("== 10 more results"), "{text}");
    assert!(text.contains("   1. panda 1  <"), "{text}");
    assert!(text.contains("  20. panda 20  <"), "{text}");
    assert_eq!(text.matches(": 4x3").count(), 2, "{text}");
    assert_eq!(services.controller.snapshot().items.len(), 20);
    assert_eq!(services.registry.active_count(), 0);
}

#[tokio::test]
async fn test_browse_reports_rejected_search() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/customsearch/v1")
        .match_query(Matcher::Any)
        .with_status(403)
        .with_body(r#"{"error":{"code":403}}"#)
        .create_async()
        .await;

    let services = wire_services(&config(&server)).unwrap();
    let out = SharedBuf::default();
    let err = browse(&services, "red panda", 1, 0, out.clone())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("red panda"));
    assert!(out.text().contains("!! searching failed: network error"), "{}", out.text());
}

#[tokio::test]
async fn test_browse_accepts_empty_result_set() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/customsearch/v1")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"queries":{"request":[{"totalResults":"0","count":0,"startIndex":1}]}}"#)
        .create_async()
        .await;

    let services = wire_services(&config(&server)).unwrap();
    browse(&services, "nothing matches", 3, 5, SharedBuf::default())
        .await
        .unwrap();

    let snapshot = services.controller.snapshot();
    assert!(snapshot.items.is_empty());
    assert!(!snapshot.has_more_pages());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_rejected_search_fails_on_multi_thread_runtime() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/customsearch/v1")
        .match_query(Matcher::Any)
        .with_status(403)
        .with_body(r#"{"error":{"code":403}}"#)
        .create_async()
        .await;

    // The controller actor runs on another worker than `browse`.
    for attempt in 0..50 {
        let services = wire_services(&config(&server)).unwrap();
        let result = browse(&services, "red panda", 2, 0, SharedBuf::default()).await;
        assert!(result.is_err(), "attempt {attempt} reported a rejected search as Ok");
    }
}

#[tokio::test]
async fn test_thumbnails_respect_configured_max_edge() {
    let mut server = Server::new_async().await;
    let base = server.url();
    let _page = server
        .mock("GET", "/customsearch/v1")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(envelope(&base, 1, None))
        .create_async()
        .await;
    let _thumbs = server
        .mock("GET", Matcher::Regex(r"^/thumb/\d+\.png$".to_string()))
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(png(8, 4))
        .create_async()
        .await;

    let mut config = config(&server);
    config.thumbnail_max_edge = Some(4);
    let services = wire_services(&config).unwrap();
    let out = SharedBuf::default();
    browse(&services, "red panda", 1, 1, out.clone()).await.unwrap();

    let text = out.text();
    assert!(text.contains(": 4x2"), "{text}");
    assert!(!text.contains(": 8x4"), "{text}");
}
