//! End-to-end checks against a running journal backend.
//!
//! Skipped unless `HOBBY_API_URL` is set, e.g.
//! `HOBBY_API_URL=http://localhost:8000/api HOBBY_API_PASSWORD=secret cargo test --test live_api`.

#![cfg(not(target_arch = "wasm32"))]

use hobby_journal_app::{
    ApiClient, EntryCreate, EntryQuery, HobbyCreate, HobbyTypeCreate, PropValue,
};

async fn signed_in_client() -> Option<ApiClient> {
    let base_url = std::env::var("HOBBY_API_URL").ok()?;
    let client = ApiClient::new(base_url);
    if let Ok(password) = std::env::var("HOBBY_API_PASSWORD") {
        client.login(&password).await.expect("login should succeed");
    }
    Some(client)
}

/// A throwaway top-level hobby plus the `book` type, created if missing.
async fn scratch_hobby(client: &ApiClient, name: &str) -> i64 {
    let types = client.hobby_types().await.expect("types should load");
    if !types.iter().any(|t| t.key == "book") {
        client
            .create_hobby_type(&HobbyTypeCreate {
                key: "book".to_string(),
                title: "Book".to_string(),
                schema_json: r#"{"type":"object","properties":{"author":{"type":"string"}}}"#
                    .to_string(),
            })
            .await
            .expect("book type should be created");
    }

    client
        .create_hobby(&HobbyCreate {
            name: name.to_string(),
            color: None,
            icon: None,
            parent_id: None,
        })
        .await
        .expect("hobby should be created")
        .id
}

#[tokio::test]
async fn created_entry_is_listed_under_its_hobby() {
    let Some(client) = signed_in_client().await else {
        return;
    };
    let hobby_id = scratch_hobby(&client, "live-test reading").await;

    let created = client
        .create_entry(&EntryCreate {
            hobby_id,
            type_key: "book".to_string(),
            title: Some("Dune".to_string()),
            description: None,
            tags: Some("scifi".to_string()),
        })
        .await
        .expect("entry should be created");

    let page = client
        .entries(&EntryQuery::for_hobby(hobby_id))
        .await
        .expect("entries should list");
    assert!(page.items.iter().any(|e| e.id == created.id));

    let props = client
        .set_entry_props(created.id, &[PropValue::new("author", "Frank Herbert")])
        .await
        .expect("props should be replaced");
    assert!(props.iter().any(|p| p.key == "author"));

    client.delete_hobby(hobby_id).await.expect("cleanup");
}

#[tokio::test]
async fn deleted_entry_leaves_the_listing() {
    let Some(client) = signed_in_client().await else {
        return;
    };
    let hobby_id = scratch_hobby(&client, "live-test deletions").await;

    let created = client
        .create_entry(&EntryCreate {
            hobby_id,
            type_key: "book".to_string(),
            title: Some("Temporary".to_string()),
            description: None,
            tags: None,
        })
        .await
        .expect("entry should be created");
    client
        .delete_entry(created.id)
        .await
        .expect("entry should be deleted");

    let page = client
        .entries(&EntryQuery::for_hobby(hobby_id))
        .await
        .expect("entries should list");
    assert!(page.items.iter().all(|e| e.id != created.id));

    let missing = client.entry(created.id).await.expect_err("entry is gone");
    assert!(missing.is_not_found());

    client.delete_hobby(hobby_id).await.expect("cleanup");
}
