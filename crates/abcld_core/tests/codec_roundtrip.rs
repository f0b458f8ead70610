use abcld_core::{
    decode, encode, AssessmentType, BoardService, CardFields, CodecError, DeliveryStyle,
    EditorConfig, LearningType,
};
use chrono::NaiveDate;
use serde_json::json;

fn populated_service() -> BoardService {
    let mut service = BoardService::with_default_board(&EditorConfig::default());
    service.set_title("Intro to Algorithms");
    let weeks = service
        .board()
        .sorted_weeks()
        .into_iter()
        .map(|week| week.id.clone())
        .collect::<Vec<_>>();

    service
        .update_week(&weeks[0], "Welcome week", NaiveDate::from_ymd_opt(2025, 9, 22))
        .unwrap();
    let fields = CardFields {
        title: "Lecture 1".to_string(),
        delivery_date: NaiveDate::from_ymd_opt(2025, 9, 23),
        duration: Some("1h".to_string()),
        delivered_by: Some("Prof. Okafor".to_string()),
        description: Some("Big-O refresher".to_string()),
        learning_types: [LearningType::Acquisition].into_iter().collect(),
        delivery_style: Some(DeliveryStyle::Lecture),
        assessment_type: None,
        notes: None,
    };
    service.add_card(&weeks[0], fields).unwrap();

    let mut quiz = CardFields::titled("Quiz");
    quiz.assessment_type = Some(AssessmentType::Formative);
    quiz.learning_types = [LearningType::Practice, LearningType::Investigation]
        .into_iter()
        .collect();
    service.add_card(&weeks[1], quiz).unwrap();
    service
        .move_week(&weeks[1], abcld_core::MoveDirection::Right)
        .unwrap();
    service
}

#[test]
fn encode_then_decode_reproduces_board() {
    let service = populated_service();
    let board = service.board();

    let text = encode(board).unwrap();
    let decoded = decode(&text).unwrap();

    assert_eq!(decoded.title, board.title);
    assert_eq!(decoded.weeks, board.weeks);
    assert_eq!(decoded.cards, board.cards);
    assert_eq!(decoded.last_modified_at, board.last_modified_at);
}

#[test]
fn encode_uses_camel_case_wire_fields() {
    let service = populated_service();
    let value: serde_json::Value =
        serde_json::from_str(&encode(service.board()).unwrap()).unwrap();

    assert_eq!(value["title"], "Intro to Algorithms");
    assert!(value["lastModifiedAt"].is_string());
    let week = &value["weeks"][0];
    assert_eq!(week["startDate"], "2025-09-22");
    assert_eq!(week["order"], 1);

    let lecture = value["cards"]
        .as_array()
        .unwrap()
        .iter()
        .find(|card| card["title"] == "Lecture 1")
        .unwrap();
    assert_eq!(lecture["weekId"], week["id"]);
    assert_eq!(lecture["deliveredBy"], "Prof. Okafor");
    assert_eq!(lecture["deliveryStyle"], "lecture");
    assert_eq!(lecture["learningTypes"], json!(["acquisition"]));
    assert_eq!(lecture["assessmentType"], serde_json::Value::Null);
}

#[test]
fn decode_without_cards_yields_empty_cards() {
    let board = decode(r#"{"title": "Empty", "weeks": []}"#).unwrap();
    assert!(board.weeks.is_empty());
    assert!(board.cards.is_empty());
    assert_eq!(board.title, "Empty");
}

#[test]
fn decode_with_malformed_cards_collection_yields_empty_cards() {
    let document = json!({
        "title": "Lenient",
        "weeks": [{ "id": "w1", "title": "Week 1", "startDate": "", "order": 1 }],
        "cards": "definitely not a list"
    });
    let board = decode(&document.to_string()).unwrap();
    assert_eq!(board.weeks.len(), 1);
    assert!(board.cards.is_empty());
}

#[test]
fn decode_without_weeks_is_format_error() {
    let err = decode(r#"{"title": "No weeks", "cards": []}"#).unwrap_err();
    assert!(matches!(err, CodecError::Format(_)));
    assert!(err.to_string().contains("missing `weeks`"));
}

#[test]
fn decode_does_not_check_references() {
    let document = json!({
        "weeks": [{ "id": "w1", "title": "Week 1", "order": 1 }],
        "cards": [{ "id": "c1", "weekId": "w-gone", "title": "Orphan", "order": 1 }]
    });
    let board = decode(&document.to_string()).unwrap();

    assert_eq!(board.title, "My Learning Design");
    assert_eq!(board.dangling_cards().len(), 1);
    assert_eq!(board.dangling_cards()[0].id, "c1");
}

#[test]
fn decode_accepts_files_written_by_the_browser_tool() {
    let document = json!({
        "title": "ABC workshop",
        "weeks": [
            { "id": "id_lx1_abc", "title": "Week 1", "startDate": "2025-02-03", "order": 1 },
            { "id": "id_lx2_def", "title": "Week 2", "startDate": "", "order": 2 }
        ],
        "cards": [{
            "title": "Kick-off",
            "weekId": "id_lx1_abc",
            "deliveryDate": "",
            "duration": "",
            "deliveredBy": "Sam",
            "description": "",
            "learningTypes": ["discussion", "collaboration"],
            "deliveryStyle": "",
            "assessmentType": "summative",
            "notes": "",
            "id": "id_lx3_ghi",
            "order": 1
        }],
        "lastModified": "2025-02-01T09:30:00.000Z"
    });

    let board = decode(&document.to_string()).unwrap();
    let card = &board.cards[0];
    assert_eq!(card.delivery_date, None);
    assert_eq!(card.duration, None);
    assert_eq!(card.delivered_by.as_deref(), Some("Sam"));
    assert_eq!(card.delivery_style, None);
    assert_eq!(card.assessment_type, Some(AssessmentType::Summative));
    assert_eq!(card.learning_types.len(), 2);
    assert_eq!(board.weeks[1].start_date, None);
    assert_eq!(
        board.last_modified_at.to_rfc3339(),
        "2025-02-01T09:30:00+00:00"
    );
}

#[test]
fn decode_degrades_loose_entries_instead_of_failing() {
    let document = json!({
        "weeks": [
            { "id": 7 },
            { "id": "w2", "title": "Week 2", "startDate": "not a date", "order": "2" }
        ],
        "cards": [
            { "title": "no id or weekId", "order": 1 },
            {
                "id": "c2",
                "weekId": 7,
                "title": "Odd",
                "deliveryDate": "23/09/2025",
                "learningTypes": ["juggling", "discussion"],
                "deliveryStyle": "seminar",
                "order": "1"
            },
            "not a card"
        ]
    });

    let board = decode(&document.to_string()).unwrap();

    assert_eq!(board.weeks.len(), 2);
    assert_eq!(board.weeks[0].id, "7");
    assert_eq!(board.weeks[0].title, "");
    assert_eq!(board.weeks[0].order, 0);
    assert_eq!(board.weeks[1].start_date, None);
    assert_eq!(board.weeks[1].order, 2);

    assert_eq!(board.cards.len(), 2);
    let orphan = &board.cards[0];
    assert_eq!(orphan.id, "");
    assert_eq!(orphan.week_id, "");
    assert_eq!(orphan.order, 1);

    let odd = &board.cards[1];
    assert_eq!(odd.week_id, "7");
    assert_eq!(odd.delivery_date, None);
    assert_eq!(odd.delivery_style, None);
    assert_eq!(odd.order, 1);
    assert_eq!(
        odd.learning_types.iter().copied().collect::<Vec<_>>(),
        vec![LearningType::Discussion]
    );
}
