use crate::e2e::helpers;

use helpers::fake_provider::{FAILING_TEXT, FAKE_AUDIO};
use helpers::{generate_body, TestContext, TEST_VOICE_ID};
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_start_with_an_empty_session(ctx: &TestContext) {
    let response = ctx.client.get("/api/session").await.unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.field("current_text"), "");
    assert_eq!(response.field("has_audio"), false);
    assert_eq!(response.field("history"), &json!([]));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_generate_a_take(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/session/generate", &generate_body("Hello world"))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.field("current_text"), "Hello world");
    assert_eq!(response.field("has_audio"), true);
    assert_eq!(response.field("audio_byte_length"), FAKE_AUDIO.len());
    assert_eq!(response.field("warnings"), &json!([]));

    let parameters = response.field("parameters");
    assert_eq!(parameters["voice_id"], TEST_VOICE_ID);
    assert_eq!(parameters["model_id"], "eleven_multilingual_v2");

    assert_eq!(ctx.provider.convert_calls(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_forward_model_and_voice_settings(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/session/generate",
            &json!({
                "text": "Fast and steady",
                "voice_id": TEST_VOICE_ID,
                "model_id": "eleven_flash_v2",
                "voice_settings": {
                    "speed": 1.2,
                    "stability": 0.3,
                    "similarity_boost": 0.9,
                    "style": 0.1,
                    "use_speaker_boost": false
                }
            }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let request = ctx.provider.last_request().unwrap();
    assert_eq!(request.model_id.as_str(), "eleven_flash_v2");
    let settings = request.voice_settings.unwrap();
    assert_eq!(settings.speed, 1.2);
    assert!(!settings.use_speaker_boost);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_empty_text_without_calling_the_provider(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/session/generate", &generate_body("   \n\t"))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("Enter some text");
    assert_eq!(ctx.provider.convert_calls(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_require_a_voice(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/session/generate",
            &json!({ "text": "Hello", "voice_id": "" }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::PRECONDITION_FAILED)
        .assert_error_message("Voice ID");
    assert_eq!(ctx.provider.convert_calls(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_require_a_credential(ctx: &TestContext) {
    let response = ctx
        .client
        .put("/api/session/credential", &json!({ "api_key": null }))
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    assert_eq!(response.field("has_credential"), false);
    assert_eq!(response.field("provider_available"), false);

    let response = ctx
        .client
        .post("/api/session/generate", &generate_body("Hello"))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::PRECONDITION_FAILED)
        .assert_error_message("API key");
    assert_eq!(ctx.provider.convert_calls(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_accept_a_new_credential(ctx: &TestContext) {
    let response = ctx
        .client
        .put("/api/session/credential", &json!({ "api_key": "  another-key  " }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.field("has_credential"), true);
    assert_eq!(response.field("provider_available"), true);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_keep_the_previous_take_when_synthesis_fails(ctx: &TestContext) {
    ctx.client
        .post("/api/session/generate", &generate_body("First take"))
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    let response = ctx
        .client
        .post("/api/session/generate", &generate_body(FAILING_TEXT))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_GATEWAY)
        .assert_error_message("upstream exploded");

    let session = ctx.client.get("/api/session").await.unwrap();
    assert_eq!(session.field("current_text"), "First take");
    assert_eq!(session.field("has_audio"), true);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_discard_audio_on_reject_but_keep_text(ctx: &TestContext) {
    ctx.client
        .post("/api/session/generate", &generate_body("Keep this text"))
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    let response = ctx.client.post_empty("/api/session/reject").await.unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.field("has_audio"), false);
    assert_eq!(response.field("current_text"), "Keep this text");

    // Nothing left to save or download
    ctx.client
        .post_empty("/api/session/save")
        .await
        .unwrap()
        .assert_status(StatusCode::CONFLICT);
    ctx.client
        .get("/api/session/audio")
        .await
        .unwrap()
        .assert_status(StatusCode::CONFLICT);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_regenerate_with_the_stored_parameters(ctx: &TestContext) {
    ctx.client
        .post(
            "/api/session/generate",
            &json!({
                "text": "Say it again",
                "voice_id": TEST_VOICE_ID,
                "model_id": "eleven_flash_v2"
            }),
        )
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    // Regenerate also works after the audio was rejected
    ctx.client
        .post_empty("/api/session/reject")
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    let response = ctx
        .client
        .post_empty("/api/session/regenerate")
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.field("has_audio"), true);
    assert_eq!(ctx.provider.convert_calls(), 2);

    let request = ctx.provider.last_request().unwrap();
    assert_eq!(request.text, "Say it again");
    assert_eq!(request.voice_id, TEST_VOICE_ID);
    assert_eq!(request.model_id.as_str(), "eleven_flash_v2");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_refuse_to_regenerate_before_any_take(ctx: &TestContext) {
    let response = ctx
        .client
        .post_empty("/api/session/regenerate")
        .await
        .unwrap();

    response
        .assert_status(StatusCode::CONFLICT)
        .assert_error_message("nothing to regenerate");
    assert_eq!(ctx.provider.convert_calls(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_clear_text_but_keep_audio(ctx: &TestContext) {
    ctx.client
        .post("/api/session/generate", &generate_body("Temporary words"))
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    let response = ctx
        .client
        .post_empty("/api/session/clear-text")
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.field("current_text"), "");
    assert_eq!(response.field("has_audio"), true);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_save_the_take_to_the_outputs_directory(ctx: &TestContext) {
    ctx.client
        .post("/api/session/generate", &generate_body("My: Test / Clip"))
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    let response = ctx.client.post_empty("/api/session/save").await.unwrap();

    response.assert_status(StatusCode::CREATED);

    let display_name = response.field("display_name").as_str().unwrap().to_string();
    assert!(
        display_name.starts_with("My_Test_Clip-"),
        "unexpected name {}",
        display_name
    );
    assert!(display_name.ends_with(".mp3"));
    assert_eq!(response.field("byte_length"), FAKE_AUDIO.len());

    let written = tokio::fs::read(ctx.outputs_dir().join(&display_name))
        .await
        .unwrap();
    assert_eq!(written, FAKE_AUDIO);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_list_saved_clips_newest_first(ctx: &TestContext) {
    for text in ["first clip", "second clip"] {
        ctx.client
            .post("/api/session/generate", &generate_body(text))
            .await
            .unwrap()
            .assert_status(StatusCode::OK);
        ctx.client
            .post_empty("/api/session/save")
            .await
            .unwrap()
            .assert_status(StatusCode::CREATED);
    }

    let response = ctx.client.get("/api/session/history").await.unwrap();
    response.assert_status(StatusCode::OK);

    let history = response.body.as_ref().unwrap().as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert!(history[0]["display_name"]
        .as_str()
        .unwrap()
        .starts_with("second_clip-"));
    assert!(history[1]["display_name"]
        .as_str()
        .unwrap()
        .starts_with("first_clip-"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_allow_saving_the_same_take_twice(ctx: &TestContext) {
    ctx.client
        .post("/api/session/generate", &generate_body("Encore"))
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    for _ in 0..2 {
        ctx.client
            .post_empty("/api/session/save")
            .await
            .unwrap()
            .assert_status(StatusCode::CREATED);
    }

    let session = ctx.client.get("/api/session").await.unwrap();
    assert_eq!(session.field("history").as_array().unwrap().len(), 2);
    assert_eq!(session.field("has_audio"), true);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_download_the_current_take(ctx: &TestContext) {
    ctx.client
        .post("/api/session/generate", &generate_body("Hello world"))
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    let response = ctx.client.get("/api/session/audio").await.unwrap();

    response
        .assert_status(StatusCode::OK)
        .assert_header("content-type", "audio/mpeg")
        .assert_header(
            "content-disposition",
            "attachment; filename=\"Hello_world.mp3\"",
        );
    assert_eq!(response.body_bytes, FAKE_AUDIO);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_download_and_save_text_with_control_characters(ctx: &TestContext) {
    ctx.client
        .post("/api/session/generate", &generate_body("Bell\u{0007}ring\u{001b}"))
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    ctx.client
        .get("/api/session/audio")
        .await
        .unwrap()
        .assert_status(StatusCode::OK)
        .assert_header(
            "content-disposition",
            "attachment; filename=\"Bell_ring.mp3\"",
        );

    let saved = ctx.client.post_empty("/api/session/save").await.unwrap();
    saved.assert_status(StatusCode::CREATED);
    let display_name = saved.field("display_name").as_str().unwrap();
    assert!(display_name.starts_with("Bell_ring-"));
    assert!(!display_name.contains(char::is_control));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_encode_non_ascii_download_names(ctx: &TestContext) {
    ctx.client
        .post("/api/session/generate", &generate_body("Grüße aus Köln"))
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    ctx.client
        .get("/api/session/audio")
        .await
        .unwrap()
        .assert_status(StatusCode::OK)
        .assert_header(
            "content-disposition",
            "attachment; filename=\"Gr__e_aus_K_ln.mp3\"; filename*=UTF-8''Gr%C3%BC%C3%9Fe_aus_K%C3%B6ln.mp3",
        );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_upload_the_dictionary_once_and_reuse_it(ctx: &TestContext) {
    let body = json!({
        "text": "Nginx serves the page",
        "voice_id": TEST_VOICE_ID,
        "use_pronunciation_dictionary": true
    });

    for _ in 0..2 {
        let response = ctx
            .client
            .post("/api/session/generate", &body)
            .await
            .unwrap();
        response.assert_status(StatusCode::OK);
        assert_eq!(response.field("warnings"), &json!([]));
    }

    assert_eq!(ctx.provider.upload_calls(), 1);

    let locators = ctx
        .provider
        .last_request()
        .unwrap()
        .pronunciation_locators
        .unwrap();
    assert_eq!(locators.len(), 1);
    assert_eq!(
        locators[0].pronunciation_dictionary_id,
        "dict-CustomPronunciations"
    );
    assert_eq!(locators[0].version_id.as_deref(), Some("ver-1"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reupload_after_the_dictionary_changes(ctx: &TestContext) {
    let body = json!({
        "text": "Nginx again",
        "voice_id": TEST_VOICE_ID,
        "use_pronunciation_dictionary": true
    });

    ctx.client
        .post("/api/session/generate", &body)
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    // Push the modification time forward so the cache key changes
    let file = std::fs::OpenOptions::new()
        .write(true)
        .open(ctx.dictionary_path())
        .unwrap();
    file.set_modified(std::time::SystemTime::now() + std::time::Duration::from_secs(60))
        .unwrap();
    drop(file);

    ctx.client
        .post("/api/session/generate", &body)
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    assert_eq!(ctx.provider.upload_calls(), 2);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_warn_and_continue_without_a_missing_dictionary(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/session/generate",
            &json!({
                "text": "No lexicon here",
                "voice_id": TEST_VOICE_ID,
                "use_pronunciation_dictionary": true,
                "pronunciation_dictionary_path": "/definitely/not/here.pls"
            }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let warnings = response.field("warnings").as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0]
        .as_str()
        .unwrap()
        .contains("PLS file not found"));

    assert_eq!(ctx.provider.upload_calls(), 0);
    assert_eq!(ctx.provider.convert_calls(), 1);
    assert!(ctx
        .provider
        .last_request()
        .unwrap()
        .pronunciation_locators
        .is_none());
}
