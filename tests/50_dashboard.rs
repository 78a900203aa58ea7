mod common;

use anyhow::Result;
use serde_json::{json, Value};

use common::{Account, TestServer};

/// Admin A owns P1 with members B and C, T1 in P1 is assigned to B.
/// Admin D owns P2 with member B, T2 in P2 is assigned to B.
struct Scenario {
    a: Account,
    b: Account,
    c: Account,
    d: Account,
    p1: String,
    p2: String,
    t1: String,
    t2: String,
}

fn id(value: &Value) -> String {
    value["id"].as_str().unwrap_or_default().to_string()
}

async fn scenario(server: &TestServer) -> Result<Scenario> {
    let a = common::register(server, "a", "admin").await?;
    let b = common::register(server, "b", "employee").await?;
    let c = common::register(server, "c", "employee").await?;
    let d = common::register(server, "d", "admin").await?;

    let p1 = id(&common::create_project(server, &a, "P1", &[b.id.as_str(), c.id.as_str()]).await?);
    let p2 = id(&common::create_project(server, &d, "P2", &[b.id.as_str()]).await?);
    let t1 = id(&common::create_task(server, &a, json!({ "title": "T1", "projectId": p1, "assignedTo": b.id })).await?);
    let t2 = id(&common::create_task(server, &d, json!({ "title": "T2", "projectId": p2, "assignedTo": b.id })).await?);

    Ok(Scenario { a, b, c, d, p1, p2, t1, t2 })
}

fn user_entry<'a>(view: &'a Value, user_id: &str) -> Option<&'a Value> {
    view["users"].as_array()?.iter().find(|u| u["id"] == user_id)
}

#[tokio::test]
async fn admin_sees_members_of_owned_projects() -> Result<()> {
    let server = common::ensure_server().await?;
    let s = scenario(server).await?;

    let view = common::dashboard(server, &s.a).await?;
    assert_eq!(view["currentUser"]["id"], s.a.id.as_str());
    assert_eq!(view["scope"]["kind"], "owned_by");
    assert_eq!(common::ids(&view["projects"]), vec![s.p1.clone()]);
    assert_eq!(common::ids(&view["tasks"]), vec![s.t1.clone()]);
    assert_eq!(common::ids(&view["users"]), vec![s.b.id.clone(), s.c.id.clone()]);

    let b = user_entry(&view, &s.b.id).expect("B listed");
    assert_eq!(common::ids(&b["projects"]), vec![s.p1.clone()]);
    assert_eq!(common::ids(&b["projects"][0]["tasks"]), vec![s.t1.clone()]);
    assert_eq!(b["projects"][0]["tasks"][0]["title"], "T1");
    assert_eq!(b["projects"][0]["tasks"][0]["status"], "Todo");
    Ok(())
}

#[tokio::test]
async fn employee_sees_member_projects_and_own_tasks() -> Result<()> {
    let server = common::ensure_server().await?;
    let s = scenario(server).await?;

    let view = common::dashboard(server, &s.b).await?;
    assert_eq!(view["scope"]["kind"], "member_of");
    assert_eq!(common::ids(&view["projects"]), vec![s.p1.clone(), s.p2.clone()]);
    assert_eq!(common::ids(&view["tasks"]), vec![s.t1.clone(), s.t2.clone()]);
    assert_eq!(common::ids(&view["users"]), vec![s.b.id.clone()]);

    let view = common::dashboard(server, &s.c).await?;
    assert_eq!(common::ids(&view["projects"]), vec![s.p1.clone()]);
    assert!(common::ids(&view["tasks"]).is_empty());
    let c = user_entry(&view, &s.c.id).expect("C listed");
    assert_eq!(c["projects"][0]["tasks"], json!([]));
    Ok(())
}

#[tokio::test]
async fn admin_without_projects_gets_empty_lists() -> Result<()> {
    let server = common::ensure_server().await?;
    let lonely = common::register(server, "lonely", "admin").await?;

    let view = common::dashboard(server, &lonely).await?;
    assert_eq!(view["currentUser"]["id"], lonely.id.as_str());
    assert_eq!(view["users"], json!([]));
    assert_eq!(view["projects"], json!([]));
    assert_eq!(view["tasks"], json!([]));
    Ok(())
}

#[tokio::test]
async fn super_admin_sees_everything() -> Result<()> {
    let server = common::ensure_server().await?;
    let s = scenario(server).await?;
    let root = common::register(server, "root", "super_admin").await?;

    let view = common::dashboard(server, &root).await?;
    assert_eq!(view["scope"]["kind"], "everything");

    let users = common::ids(&view["users"]);
    for user in [&s.a.id, &s.b.id, &s.c.id, &s.d.id, &root.id] {
        assert!(users.contains(user));
    }
    let projects = common::ids(&view["projects"]);
    assert!(projects.contains(&s.p1) && projects.contains(&s.p2));
    let tasks = common::ids(&view["tasks"]);
    assert!(tasks.contains(&s.t1) && tasks.contains(&s.t2));
    Ok(())
}

#[tokio::test]
async fn repeated_requests_are_identical() -> Result<()> {
    let server = common::ensure_server().await?;
    let s = scenario(server).await?;

    let first = common::dashboard(server, &s.d).await?;
    let second = common::dashboard(server, &s.d).await?;
    assert_eq!(first, second);
    assert_eq!(common::ids(&first["projects"]), vec![s.p2.clone()]);
    Ok(())
}
