use benefits_chat::Provider;
use benefits_chat::inference::{
    AdapterError, ModelCatalog, RequestPayload, Turn, build_request, extract_answer_text,
};
use serde_json::{Value, json};

/// A response body of the shape `provider` returns, carrying `text` at its answer path.
fn synthetic_response(provider: Provider, text: &str) -> Value {
    match provider {
        Provider::Claude => json!({"content": [{"type": "text", "text": text}]}),
        Provider::Titan => json!({"results": [{"outputText": text, "tokenCount": 3}]}),
        Provider::Llama => json!({"generation": text, "stop_reason": "stop"}),
    }
}

fn conversation() -> Vec<Turn> {
    vec![
        Turn::user("What is my deductible?"),
        Turn::assistant("$500 per year."),
        Turn::user("And the copay?"),
    ]
}

#[test]
fn test_build_then_extract_recovers_text_for_every_provider() {
    let catalog = ModelCatalog::default();
    for provider in Provider::ALL {
        let adapted = build_request(&catalog, provider.as_str(), &conversation(), None).unwrap();
        assert_eq!(adapted.payload.provider(), provider);

        let answer = "Copay is $20.\nSpecialists: $40.";
        let response = synthetic_response(provider, answer);
        assert_eq!(
            extract_answer_text(provider.as_str(), &response).unwrap(),
            answer
        );
    }
}

#[test]
fn test_every_cross_shape_extraction_is_rejected() {
    for requested in Provider::ALL {
        for returned in Provider::ALL.into_iter().filter(|p| *p != requested) {
            let response = synthetic_response(returned, "misrouted");
            let err = extract_answer_text(requested.as_str(), &response).unwrap_err();
            assert!(
                matches!(err, AdapterError::MalformedResponse { provider, .. } if provider == requested),
                "{returned} body accepted as {requested}"
            );
        }
    }
}

#[test]
fn test_unknown_provider_rejected_everywhere() {
    let catalog = ModelCatalog::default();
    assert!(matches!(
        catalog.resolve_model_identifier("bard"),
        Err(AdapterError::UnknownProvider(_))
    ));
    assert!(matches!(
        build_request(&catalog, "bard", &conversation(), None),
        Err(AdapterError::UnknownProvider(_))
    ));
    assert!(matches!(
        extract_answer_text("bard", &json!({})),
        Err(AdapterError::UnsupportedProvider(_))
    ));
}

#[test]
fn test_tagged_variants_keep_turn_order() {
    let catalog = ModelCatalog::default();
    let expected_tail = "<user>What is my deductible?</user>\n\
                         <assistant>$500 per year.</assistant>\n\
                         <user>And the copay?</user><assistant>";

    let titan = build_request(&catalog, "titan", &conversation(), None).unwrap();
    let RequestPayload::Titan(titan) = titan.payload else {
        panic!("expected Titan payload");
    };
    assert!(titan.input_text.ends_with(expected_tail));

    let llama = build_request(&catalog, "llama", &conversation(), None).unwrap();
    let RequestPayload::Llama(llama) = llama.payload else {
        panic!("expected Llama payload");
    };
    assert!(llama.prompt.ends_with(expected_tail));
    assert_eq!(titan.input_text, llama.prompt);
}

#[test]
fn test_empty_conversation_still_builds() {
    let catalog = ModelCatalog::default();
    for provider in Provider::ALL {
        let adapted = build_request(&catalog, provider.as_str(), &[], Some("doc")).unwrap();
        let json: Value = serde_json::from_str(&adapted.payload.to_json().unwrap()).unwrap();
        assert!(json.is_object());
    }
}
