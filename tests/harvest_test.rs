use recast::harvest::Harvester;
use recast::scraping;

fn listing_page(titles_and_slugs: &[(&str, &str)], last_page: Option<u32>) -> String {
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
    if let Some(last) = last_page {
        html.push_str("<nav>");
        for n in 1..=last {
            html.push_str(&format!(
                r#"<a class="page-numbers" href="/blogs/page/{n}/">{n}</a>"#
            ));
        }
        html.push_str(r##"<a class="page-numbers next" href="#">Next</a></nav>"##);
    }
    html.push_str("</body></html>");
    html
}

#[tokio::test]
async fn test_harvest_walks_back_from_last_page() {
    let mut server = mockito::Server::new_async().await;

    // Root listing: newest articles + pagination saying there are 2 pages.
    let _root = server
        .mock("GET", "/blogs/")
        .with_status(200)
        .with_body(listing_page(
            &[("Newest", "newest"), ("Newer", "newer"), ("New", "new")],
            Some(2),
        ))
        .create_async()
        .await;

    // Page 2 is the oldest segment of the site.
    let _page2 = server
        .mock("GET", "/blogs/page/2/")
        .with_status(200)
        .with_body(listing_page(
            &[("Oldest", "oldest"), ("Older", "older"), ("Old", "old")],
            Some(2),
        ))
        .create_async()
        .await;

    let client = scraping::build_client(5).unwrap();
    let harvester = Harvester::new(client, &format!("{}/blogs/", server.url())).unwrap();

    let stubs = harvester.harvest_oldest(5).await;

    // Last page first, top-to-bottom, then the previous page appended.
    assert_eq!(stubs.len(), 5);
    let titles: Vec<&str> = stubs.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Oldest", "Older", "Old", "Newest", "Newer"]);
    assert!(stubs.iter().all(|s| !s.title.is_empty() && !s.source_url.is_empty()));
    assert!(stubs[0].source_url.ends_with("/blogs/oldest/"));
    assert!(stubs[0].excerpt.contains("Excerpt for Oldest."));
}

#[tokio::test]
async fn test_harvest_single_page_listing() {
    let mut server = mockito::Server::new_async().await;

    // No pagination markers at all: the root is the only page.
    let _root = server
        .mock("GET", "/blogs/")
        .with_status(200)
        .with_body(listing_page(&[("Only", "only"), ("Other", "other")], None))
        .create_async()
        .await;

    let client = scraping::build_client(5).unwrap();
    let harvester = Harvester::new(client, &format!("{}/blogs/", server.url())).unwrap();

    let stubs = harvester.harvest_oldest(5).await;

    assert_eq!(stubs.len(), 2);
    assert_eq!(stubs[0].title, "Only");
}

#[tokio::test]
async fn test_harvest_never_exceeds_target() {
    let mut server = mockito::Server::new_async().await;

    let many: Vec<(String, String)> = (0..8)
        .map(|i| (format!("Post {i}"), format!("post-{i}")))
        .collect();
    let many_refs: Vec<(&str, &str)> =
        many.iter().map(|(t, s)| (t.as_str(), s.as_str())).collect();

    let _root = server
        .mock("GET", "/blogs/")
        .with_status(200)
        .with_body(listing_page(&many_refs, None))
        .create_async()
        .await;

    let client = scraping::build_client(5).unwrap();
    let harvester = Harvester::new(client, &format!("{}/blogs/", server.url())).unwrap();

    let stubs = harvester.harvest_oldest(3).await;
    assert_eq!(stubs.len(), 3);
}

#[tokio::test]
async fn test_harvest_degrades_on_page_failure() {
    let mut server = mockito::Server::new_async().await;

    let _root = server
        .mock("GET", "/blogs/")
        .with_status(200)
        .with_body(listing_page(&[("Rooted", "rooted")], Some(2)))
        .create_async()
        .await;

    // The last page is gone; the harvest continues with page 1.
    let _page2 = server
        .mock("GET", "/blogs/page/2/")
        .with_status(404)
        .create_async()
        .await;

    let client = scraping::build_client(5).unwrap();
    let harvester = Harvester::new(client, &format!("{}/blogs/", server.url())).unwrap();

    let stubs = harvester.harvest_oldest(5).await;

    assert_eq!(stubs.len(), 1);
    assert_eq!(stubs[0].title, "Rooted");
}
