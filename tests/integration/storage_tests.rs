use crate::common::*;
use shelf_harvest::config::OutputConfig;
use shelf_harvest::scraper::ScraperSession;
use shelf_harvest::storage::{CollectionStore, CollectionStores, CsvStore, JsonStore};
use tempfile::TempDir;
use wiremock::MockServer;

fn output_config(dir: &TempDir) -> OutputConfig {
    OutputConfig {
        csv_dir: dir.path().join("CsvFolder").to_string_lossy().into_owned(),
        json_dir: dir.path().join("JsonFolder").to_string_lossy().into_owned(),
    }
}

#[tokio::test]
async fn test_harvested_collection_survives_both_formats() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;
    mount_search_page(
        &server,
        "kettle",
        1,
        search_page(vec![hit(1, 3), hit(2, 0)], 1, 2),
    )
    .await;
    mount_catalogue(&server, 3).await;

    let session = ScraperSession::new(create_test_config(&server)).unwrap();
    let collection = session.search_for_products("kettle").await.unwrap();

    let dir = TempDir::new().unwrap();
    let stores = CollectionStores::open(&output_config(&dir));
    let (csv_path, json_path) = stores.save(&collection).unwrap();

    assert!(csv_path.ends_with("CsvFolder/kettle.csv"));
    assert!(json_path.ends_with("JsonFolder/kettle.json"));

    let from_csv = CsvStore::new(dir.path().join("CsvFolder")).load("kettle").unwrap();
    let from_json = JsonStore::new(dir.path().join("JsonFolder")).load("kettle").unwrap();

    assert_eq!(from_csv, collection);
    assert_eq!(from_json, collection);
    assert_eq!(from_csv.products()[0].reviews().len(), 3);
}

#[test]
fn test_load_all_reads_every_collection() {
    let dir = TempDir::new().unwrap();
    let stores = CollectionStores::open(&output_config(&dir));

    for name in ["beta", "alpha"] {
        let product = shelf_harvest::Product::new(
            "1",
            "Thing",
            1.0,
            "https://shop.example.com/product/1",
            2.0,
            "",
            vec![],
        )
        .unwrap();
        let collection = shelf_harvest::Collection::new(name, vec![product]).unwrap();
        stores.save(&collection).unwrap();
    }

    let all = stores.json.load_all().unwrap();
    let names: Vec<&str> = all.iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["alpha", "beta"]);

    assert!(stores.delete("alpha").unwrap());
    assert_eq!(stores.csv.list_names().unwrap(), vec!["beta"]);
    assert_eq!(stores.json.list_names().unwrap(), vec!["beta"]);
}

#[test]
fn test_corrupt_file_fails_whole_load() {
    let dir = TempDir::new().unwrap();
    let config = output_config(&dir);
    std::fs::create_dir_all(&config.csv_dir).unwrap();
    std::fs::write(
        std::path::Path::new(&config.csv_dir).join("broken.csv"),
        "productID,name,price,url,rating,description,reviews\n\
         1,A,abc,https://shop.example.com/product/1,4.0,d,[]\n",
    )
    .unwrap();

    let stores = CollectionStores::open(&config);
    assert!(stores.load("broken").is_err());
    assert!(stores.csv.load_all().is_err());
}
