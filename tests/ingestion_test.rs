use mockito::Matcher;
use recast::harvest::Harvester;
use recast::ingestion::{self, IngestReport};
use recast::scraping;
use recast::storage::ArticleStore;

fn listing_with(titles_and_slugs: &[(&str, &str)]) -> String {
    let mut html = String::from("<html><body>");
    for (title, slug) in titles_and_slugs {
        html.push_str(&format!(
            r#"<article>
                 <h2>{title}</h2>
                 <a href="/blogs/{slug}/">read more</a>
                 <div class="entry-content"><p>Excerpt for {title}.</p></div>
               </article>"#
        ));
    }
    html.push_str("</body></html>");
    html
}

fn article_json(id: i64, title: &str, original_url: &str) -> String {
    format!(
        r#"{{"id": {id}, "title": "{title}", "content": "stored", "original_url": "{original_url}", "source_citations": null, "is_updated": 0}}"#
    )
}

#[tokio::test]
async fn test_batch_continues_past_one_create_failure() {
    let mut server = mockito::Server::new_async().await;
    let base = server.url();

    let posts = [("A1", "a1"), ("A2", "a2"), ("A3", "a3"), ("A4", "a4"), ("A5", "a5")];
    let _root = server
        .mock("GET", "/blogs/")
        .with_status(200)
        .with_body(listing_with(&posts))
        .create_async()
        .await;

    // A1 has a fetchable permalink, the rest fall back to their excerpts.
    let _full = server
        .mock("GET", "/blogs/a1/")
        .with_status(200)
        .with_body(r#"<div class="entry-content"><p>Full body of A1.</p></div>"#)
        .create_async()
        .await;
    for slug in ["a2", "a3", "a4", "a5"] {
        server
            .mock("GET", format!("/blogs/{slug}/").as_str())
            .with_status(404)
            .create_async()
            .await;
    }

    let _list = server
        .mock("GET", "/articles")
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    // Storage rejects the create for A3; every other create succeeds.
    let mut create_mocks = Vec::new();
    for (i, (title, slug)) in posts.iter().enumerate() {
        let mock = server
            .mock("POST", "/articles")
            .match_body(Matcher::PartialJsonString(format!(r#"{{"title": "{title}"}}"#)))
            .with_status(if *title == "A3" { 500 } else { 201 })
            .with_body(article_json(
                i as i64 + 1,
                title,
                &format!("{base}/blogs/{slug}/"),
            ))
            .expect(1)
            .create_async()
            .await;
        create_mocks.push(mock);
    }

    let client = scraping::build_client(5).unwrap();
    let harvester = Harvester::new(client.clone(), &format!("{base}/blogs/")).unwrap();
    let store = ArticleStore::new(&format!("{base}/articles"), 5).unwrap();

    let report = ingestion::run(&harvester, &client, &store, 5).await;

    assert_eq!(
        report,
        IngestReport {
            created: 4,
            skipped: 0,
            failed: 1
        }
    );
    for mock in &create_mocks {
        mock.assert_async().await;
    }
}

#[tokio::test]
async fn test_rerun_skips_already_persisted_urls() {
    let mut server = mockito::Server::new_async().await;
    let base = server.url();

    let posts = [("B1", "b1"), ("B2", "b2")];
    let _root = server
        .mock("GET", "/blogs/")
        .with_status(200)
        .with_body(listing_with(&posts))
        .create_async()
        .await;
    for slug in ["b1", "b2"] {
        server
            .mock("GET", format!("/blogs/{slug}/").as_str())
            .with_status(404)
            .create_async()
            .await;
    }

    // B1 was persisted by an earlier run.
    let _list = server
        .mock("GET", "/articles")
        .with_status(200)
        .with_body(format!("[{}]", article_json(1, "B1", &format!("{base}/blogs/b1/"))))
        .create_async()
        .await;

    let create_b2 = server
        .mock("POST", "/articles")
        .match_body(Matcher::PartialJsonString(r#"{"title": "B2"}"#.to_string()))
        .with_status(201)
        .with_body(article_json(2, "B2", &format!("{base}/blogs/b2/")))
        .expect(1)
        .create_async()
        .await;
    let create_b1 = server
        .mock("POST", "/articles")
        .match_body(Matcher::PartialJsonString(r#"{"title": "B1"}"#.to_string()))
        .expect(0)
        .create_async()
        .await;

    let client = scraping::build_client(5).unwrap();
    let harvester = Harvester::new(client.clone(), &format!("{base}/blogs/")).unwrap();
    let store = ArticleStore::new(&format!("{base}/articles"), 5).unwrap();

    let report = ingestion::run(&harvester, &client, &store, 5).await;

    assert_eq!(
        report,
        IngestReport {
            created: 1,
            skipped: 1,
            failed: 0
        }
    );
    create_b2.assert_async().await;
    create_b1.assert_async().await;
}
