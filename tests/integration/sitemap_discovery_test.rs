// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{mount_sitemap, sitemap};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_xml(server: &MockServer, route: &str, xml: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(xml, "application/xml"))
        .mount(server)
        .await;
}

fn urlset(urls: &[String]) -> String {
    let body: String = urls
        .iter()
        .map(|u| format!("<url><loc>{}</loc></url>", u))
        .collect();
    format!(r#"<?xml version="1.0"?><urlset>{}</urlset>"#, body)
}

#[tokio::test]
async fn test_fallback_to_sitemap_xml() {
    let server = MockServer::start().await;
    mount_sitemap(&server, &["/a", "/b"]).await;

    let urls = sitemap()
        .discover(&format!("{}/", server.uri()), 50)
        .await
        .unwrap();

    assert_eq!(
        urls,
        vec![format!("{}/a", server.uri()), format!("{}/b", server.uri())]
    );
}

#[tokio::test]
async fn test_robots_sitemap_lines_are_followed() {
    let server = MockServer::start().await;
    let robots = "User-agent: *\nDisallow: /private\nSitemap: /pages.xml\n";
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(robots))
        .mount(&server)
        .await;
    mount_xml(&server, "/pages.xml", urlset(&[format!("{}/from-robots", server.uri())])).await;
    mount_sitemap(&server, &["/from-fallback"]).await;

    let urls = sitemap()
        .discover(&format!("{}/", server.uri()), 50)
        .await
        .unwrap();

    assert_eq!(urls, vec![format!("{}/from-robots", server.uri())]);
}

#[tokio::test]
async fn test_sitemap_index_followed_one_level() {
    let server = MockServer::start().await;
    let index = format!(
        r#"<?xml version="1.0"?><sitemapindex><sitemap><loc>{0}/one.xml</loc></sitemap><sitemap><loc>{0}/two.xml</loc></sitemap></sitemapindex>"#,
        server.uri()
    );
    mount_xml(&server, "/sitemap.xml", index).await;
    mount_xml(&server, "/one.xml", urlset(&[format!("{}/x", server.uri())])).await;
    mount_xml(
        &server,
        "/two.xml",
        urlset(&[format!("{}/y", server.uri()), format!("{}/x", server.uri())]),
    )
    .await;

    let urls = sitemap()
        .discover(&format!("{}/", server.uri()), 50)
        .await
        .unwrap();

    assert_eq!(
        urls,
        vec![format!("{}/x", server.uri()), format!("{}/y", server.uri())]
    );
}

#[tokio::test]
async fn test_limit_caps_results() {
    let server = MockServer::start().await;
    mount_sitemap(&server, &["/1", "/2", "/3", "/4"]).await;

    let urls = sitemap()
        .discover(&format!("{}/", server.uri()), 2)
        .await
        .unwrap();
    assert_eq!(urls.len(), 2);

    let none = sitemap()
        .discover(&format!("{}/", server.uri()), 0)
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_missing_sitemap_yields_empty_list() {
    let server = MockServer::start().await;

    let urls = sitemap()
        .discover(&format!("{}/", server.uri()), 50)
        .await
        .unwrap();
    assert!(urls.is_empty());
}

#[tokio::test]
async fn test_invalid_start_url_is_an_error() {
    assert!(sitemap().discover("not a url", 10).await.is_err());
}
