mod common;

use common::{ScriptedTransport, client_with, fail, ok};
use flickr_rpc::{Args, Entity, Error, SIGNATURE_KEY, Session, sign};

#[tokio::test]
async fn test_call_builds_request_and_maps_payload() {
    let transport = ScriptedTransport::new();
    transport.push_body(&ok(
        r#"<user id="12037949754@N01" nsid="12037949754@N01"><username>bees</username></user>"#,
    ));
    let client = client_with(Session::new("key"), &transport);

    let user = client
        .method("people")
        .child("findByUsername")
        .call(Args::new().with("username", "bees"))
        .await
        .unwrap();

    assert_eq!(user.attr("nsid"), Some("12037949754@N01"));
    assert_eq!(user.attr("username"), Some("bees"));
    assert!(user.as_user().is_some());

    let query = transport.query(0);
    assert_eq!(query["method"], "flickr.people.findByUsername");
    assert_eq!(query["api_key"], "key");
    assert_eq!(query["username"], "bees");
    assert!(transport.requests()[0].starts_with("https://api.flickr.com/services/rest?"));
}

#[tokio::test]
async fn test_building_a_path_does_not_touch_the_network() {
    let transport = ScriptedTransport::new();
    let client = client_with(Session::new("key"), &transport);

    let method = client.method("photos").child("geo").child("getLocation");
    assert_eq!(method.name(), "flickr.photos.geo.getLocation");
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_signed_call_includes_token_and_signature() {
    let transport = ScriptedTransport::new();
    transport.push_body(&ok(r#"<auth><token>tok</token><perms>read</perms></auth>"#));
    let session = Session::new("key")
        .with_secret("secret")
        .with_auth_token("tok");
    let client = client_with(session, &transport);

    let auth = client.method("auth.checkToken").call(Args::new()).await.unwrap();
    assert_eq!(auth.attr("perms"), Some("read"));

    let mut query = transport.query(0);
    let signature = query.remove(SIGNATURE_KEY).unwrap();
    assert_eq!(query["auth_token"], "tok");
    assert_eq!(signature, sign(query.iter(), "secret"));
}

#[tokio::test]
async fn test_unsigned_call_has_no_signature() {
    let transport = ScriptedTransport::new();
    transport.push_body(&ok("<method>flickr.test.echo</method>"));
    let client = client_with(Session::new("key"), &transport);

    let echoed = client.method("test.echo").call(Args::new()).await.unwrap();
    assert_eq!(echoed.text(), Some("flickr.test.echo"));
    assert!(!transport.query(0).contains_key(SIGNATURE_KEY));
}

#[tokio::test]
async fn test_list_argument_is_comma_joined() {
    let transport = ScriptedTransport::new();
    transport.push_body(&ok(r#"<photos page="1" pages="1" />"#));
    let client = client_with(Session::new("key"), &transport);

    client
        .method("photos.search")
        .call(Args::new().with("tags", vec!["a", "b", "c"]))
        .await
        .unwrap();

    assert_eq!(transport.query(0)["tags"], "a,b,c");
    assert!(transport.requests()[0].contains("tags=a%2Cb%2Cc"));
}

#[tokio::test]
async fn test_failure_envelope_is_protocol_error() {
    let transport = ScriptedTransport::new();
    transport.push_body(&fail("1", "not found"));
    let client = client_with(Session::new("key"), &transport);

    match client.method("people.getInfo").call(Args::new()).await {
        Err(Error::Protocol { code, message }) => {
            assert_eq!(code, "1");
            assert_eq!(message, "not found");
        }
        other => panic!("expected protocol error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_multiple_payload_children_become_list() {
    let transport = ScriptedTransport::new();
    transport.push_body(&ok(
        r#"<prevphoto id="1" secret="a"/><nextphoto id="3" secret="c"/>"#,
    ));
    let client = client_with(Session::new("key"), &transport);

    let context = client
        .method("photos.getContext")
        .call(Args::new().with("photo_id", "2"))
        .await
        .unwrap();

    let items = context.as_list().expect("list result");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_photo().unwrap().id(), Some("1"));
    assert_eq!(items[1].as_photo().unwrap().id(), Some("3"));
}

#[tokio::test]
async fn test_unmodelled_repetition_is_attribute_conflict() {
    let transport = ScriptedTransport::new();
    transport.push_body(&ok(
        r#"<person nsid="1"><photosurl>a</photosurl><photosurl>b</photosurl></person>"#,
    ));
    let client = client_with(Session::new("key"), &transport);

    let result = client.method("people.getInfo").call(Args::new()).await;
    assert!(matches!(result, Err(Error::AttributeConflict { .. })));
}

#[tokio::test]
async fn test_transport_error_is_not_retried() {
    let transport = ScriptedTransport::new();
    transport.push_error(Error::HttpStatus {
        url: "https://api.flickr.com/services/rest".to_string(),
        status: 503,
        message: "HTTP 503: Service Unavailable".to_string(),
    });
    let client = client_with(Session::new("key"), &transport);

    let result = client.method("test.echo").call(Args::new()).await;
    assert!(matches!(result, Err(Error::HttpStatus { status: 503, .. })));
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn test_nested_fields_and_missing_fields() {
    let transport = ScriptedTransport::new();
    transport.push_body(&ok(
        r#"<person nsid="1@N01"><realname>Ian</realname><photos><count>42</count></photos><description/></person>"#,
    ));
    let client = client_with(Session::new("key"), &transport);

    let person = client.method("people.getInfo").call(Args::new()).await.unwrap();
    assert_eq!(person.attr("realname"), Some("Ian"));
    assert_eq!(person.get("photos").unwrap().attr("count"), Some("42"));
    assert_eq!(person.get("description"), Some(&Entity::Text(None)));
    assert!(person.get("location").is_none());
}

#[tokio::test]
async fn test_method_argument_does_not_redirect_call() {
    let transport = ScriptedTransport::new();
    transport.push_body(&ok(r#"<person nsid="1@N01"/>"#));
    let client = client_with(Session::new("key"), &transport);

    client
        .method("people.getInfo")
        .call(Args::new().with("method", "flickr.photos.delete"))
        .await
        .unwrap();

    assert_eq!(transport.query(0)["method"], "flickr.people.getInfo");
}
