//! Server-rendered shells for the client application. Access control for
//! these routes happens in [`crate::middleware::page_access_middleware`].

use axum::{extract::Path, response::Html};

fn shell(title: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Ward Notes</title>
</head>
<body>
<div id="root"></div>
</body>
</html>
"#
    ))
}

pub async fn login_page() -> Html<String> {
    shell("Sign in")
}

pub async fn dashboard_page() -> Html<String> {
    shell("Patients")
}

pub async fn patient_page(Path(_id): Path<String>) -> Html<String> {
    shell("Patient")
}

pub async fn new_entry_page(Path(_id): Path<String>) -> Html<String> {
    shell("New entry")
}

pub async fn entry_page(Path((_id, _entry_id)): Path<(String, String)>) -> Html<String> {
    shell("Entry")
}

pub async fn admin_users_page() -> Html<String> {
    shell("User management")
}
