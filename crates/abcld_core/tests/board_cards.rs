use abcld_core::{
    AssessmentType, BoardChange, BoardError, BoardService, CardFields, DeliveryStyle,
    EditorConfig, EntityRef, LearningType, ValidationError,
};
use chrono::NaiveDate;

fn setup() -> (BoardService, Vec<String>) {
    let service = BoardService::with_default_board(&EditorConfig::default());
    let ids = service
        .board()
        .sorted_weeks()
        .into_iter()
        .map(|week| week.id.clone())
        .collect();
    (service, ids)
}

fn add(service: &mut BoardService, week_id: &str, title: &str) -> String {
    match service.add_card(week_id, CardFields::titled(title)).unwrap() {
        BoardChange::CardAdded { card_id, .. } => card_id,
        other => panic!("unexpected change: {other:?}"),
    }
}

fn titles_in_week(service: &BoardService, week_id: &str) -> Vec<String> {
    service
        .board()
        .cards_in_week(week_id)
        .into_iter()
        .map(|card| card.title.clone())
        .collect()
}

#[test]
fn cards_added_to_a_week_get_sequential_orders() {
    let (mut service, weeks) = setup();

    let lecture = add(&mut service, &weeks[0], "Lecture 1");
    let lab = add(&mut service, &weeks[0], "Lab 1");

    let board = service.board();
    assert_eq!(board.card(&lecture).unwrap().order, 1);
    assert_eq!(board.card(&lab).unwrap().order, 2);
    assert_eq!(titles_in_week(&service, &weeks[0]), vec!["Lecture 1", "Lab 1"]);
}

#[test]
fn add_card_rejects_blank_titles_without_mutation() {
    let (mut service, weeks) = setup();
    add(&mut service, &weeks[0], "Existing");

    for title in ["", "   ", "\t\n"] {
        let err = service
            .add_card(&weeks[0], CardFields::titled(title))
            .unwrap_err();
        assert_eq!(err, BoardError::Validation(ValidationError::EmptyCardTitle));
    }
    assert_eq!(service.board().cards.len(), 1);
}

#[test]
fn add_card_to_unknown_week_is_not_found() {
    let (mut service, _) = setup();
    let err = service
        .add_card("ghost", CardFields::titled("Lecture"))
        .unwrap_err();
    assert_eq!(err, BoardError::NotFound(EntityRef::Week("ghost".to_string())));
    assert!(service.board().cards.is_empty());
}

#[test]
fn add_card_stores_trimmed_fields() {
    let (mut service, weeks) = setup();
    let mut fields = CardFields::titled("  Seminar  ");
    fields.duration = Some(" 2h ".to_string());
    fields.delivered_by = Some("   ".to_string());
    fields.learning_types.insert(LearningType::Discussion);

    let card_id = match service.add_card(&weeks[1], fields).unwrap() {
        BoardChange::CardAdded { card_id, .. } => card_id,
        other => panic!("unexpected change: {other:?}"),
    };

    let card = service.board().card(&card_id).unwrap();
    assert_eq!(card.title, "Seminar");
    assert_eq!(card.duration.as_deref(), Some("2h"));
    assert_eq!(card.delivered_by, None);
    assert!(card.learning_types.contains(&LearningType::Discussion));
}

#[test]
fn update_card_overwrites_fields_and_keeps_position() {
    let (mut service, weeks) = setup();
    add(&mut service, &weeks[2], "First");
    let card_id = add(&mut service, &weeks[2], "Draft");

    let fields = CardFields {
        title: "Lab: sorting".to_string(),
        delivery_date: NaiveDate::from_ymd_opt(2025, 10, 14),
        duration: Some("90 min".to_string()),
        delivered_by: Some("Dr. Rivera".to_string()),
        description: Some("Pair programming".to_string()),
        learning_types: [LearningType::Practice, LearningType::Collaboration]
            .into_iter()
            .collect(),
        delivery_style: Some(DeliveryStyle::Lab),
        assessment_type: Some(AssessmentType::Formative),
        notes: Some("Book room 2.14".to_string()),
    };
    let change = service.update_card(&card_id, fields.clone()).unwrap();
    assert_eq!(
        change,
        BoardChange::CardUpdated {
            card_id: card_id.clone()
        }
    );

    let card = service.board().card(&card_id).unwrap();
    assert_eq!(card.fields(), fields);
    assert_eq!(card.week_id, weeks[2]);
    assert_eq!(card.order, 2);
}

#[test]
fn update_card_clears_optional_fields() {
    let (mut service, weeks) = setup();
    let mut fields = CardFields::titled("Quiz");
    fields.assessment_type = Some(AssessmentType::Summative);
    fields.notes = Some("closed book".to_string());
    let card_id = match service.add_card(&weeks[0], fields).unwrap() {
        BoardChange::CardAdded { card_id, .. } => card_id,
        other => panic!("unexpected change: {other:?}"),
    };

    service
        .update_card(&card_id, CardFields::titled("Quiz"))
        .unwrap();

    let card = service.board().card(&card_id).unwrap();
    assert_eq!(card.assessment_type, None);
    assert_eq!(card.notes, None);
}

#[test]
fn update_card_failures_leave_card_untouched() {
    let (mut service, weeks) = setup();
    let card_id = add(&mut service, &weeks[0], "Keep me");
    let before = service.board().clone();

    let blank = service
        .update_card(&card_id, CardFields::titled("  "))
        .unwrap_err();
    assert_eq!(blank, BoardError::Validation(ValidationError::EmptyCardTitle));

    let missing = service
        .update_card("missing", CardFields::titled("x"))
        .unwrap_err();
    assert_eq!(
        missing,
        BoardError::NotFound(EntityRef::Card("missing".to_string()))
    );
    assert_eq!(service.board(), &before);
}

#[test]
fn delete_card_does_not_renumber_siblings() {
    let (mut service, weeks) = setup();
    let first = add(&mut service, &weeks[0], "One");
    add(&mut service, &weeks[0], "Two");
    add(&mut service, &weeks[0], "Three");

    let change = service.delete_card(&first).unwrap();
    assert_eq!(
        change,
        BoardChange::CardDeleted {
            card_id: first.clone(),
            week_id: weeks[0].clone(),
        }
    );

    let orders = service
        .board()
        .cards_in_week(&weeks[0])
        .into_iter()
        .map(|card| card.order)
        .collect::<Vec<_>>();
    assert_eq!(orders, vec![2, 3]);

    let err = service.delete_card(&first).unwrap_err();
    assert!(matches!(err, BoardError::NotFound(EntityRef::Card(_))));
}

#[test]
fn move_card_appends_with_count_based_order() {
    let (mut service, weeks) = setup();
    let card_id = add(&mut service, &weeks[0], "Travelling");
    add(&mut service, &weeks[4], "Week five A");
    add(&mut service, &weeks[4], "Week five B");

    let change = service.move_card_to_week(&card_id, &weeks[4]).unwrap();
    assert_eq!(
        change,
        BoardChange::CardMoved {
            card_id: card_id.clone(),
            from_week: weeks[0].clone(),
            to_week: weeks[4].clone(),
            order: 2,
        }
    );

    let card = service.board().card(&card_id).unwrap();
    assert_eq!(card.week_id, weeks[4]);
    assert_eq!(card.order, 2);
    assert_eq!(service.board().card_count_in_week(&weeks[0]), 0);
}

#[test]
fn move_card_to_unknown_week_is_silent_noop() {
    let (mut service, weeks) = setup();
    let card_id = add(&mut service, &weeks[0], "Stay");
    let before = service.board().clone();

    let change = service.move_card_to_week(&card_id, "nowhere").unwrap();
    assert_eq!(change, BoardChange::Unchanged);
    assert_eq!(service.board(), &before);
}

#[test]
fn move_unknown_card_is_not_found() {
    let (mut service, weeks) = setup();
    let err = service.move_card_to_week("ghost", &weeks[1]).unwrap_err();
    assert_eq!(err, BoardError::NotFound(EntityRef::Card("ghost".to_string())));
}

#[test]
fn dropping_a_card_on_its_own_week_moves_it_to_the_count() {
    let (mut service, weeks) = setup();
    let first = add(&mut service, &weeks[0], "A");
    let second = add(&mut service, &weeks[0], "B");

    let change = service.move_card_to_week(&first, &weeks[0]).unwrap();
    assert_eq!(
        change,
        BoardChange::CardMoved {
            card_id: first.clone(),
            from_week: weeks[0].clone(),
            to_week: weeks[0].clone(),
            order: 2,
        }
    );
    assert_eq!(service.board().card(&first).unwrap().order, 2);
    assert_eq!(service.board().card(&second).unwrap().order, 2);
}

#[test]
fn orders_can_collide_until_normalized() {
    let (mut service, weeks) = setup();
    let first = add(&mut service, &weeks[0], "One");
    add(&mut service, &weeks[0], "Two");
    add(&mut service, &weeks[0], "Three");
    let mover = add(&mut service, &weeks[1], "Mover");

    service.delete_card(&first).unwrap();
    service.move_card_to_week(&mover, &weeks[0]).unwrap();

    let orders = service
        .board()
        .cards_in_week(&weeks[0])
        .into_iter()
        .map(|card| card.order)
        .collect::<Vec<_>>();
    assert_eq!(orders, vec![2, 2, 3]);
    assert_eq!(titles_in_week(&service, &weeks[0]), vec!["Two", "Mover", "Three"]);

    let change = service.normalize_card_order(&weeks[0]).unwrap();
    assert_eq!(
        change,
        BoardChange::CardsRenumbered {
            week_id: weeks[0].clone()
        }
    );
    let orders = service
        .board()
        .cards_in_week(&weeks[0])
        .into_iter()
        .map(|card| card.order)
        .collect::<Vec<_>>();
    assert_eq!(orders, vec![1, 2, 3]);
    assert_eq!(titles_in_week(&service, &weeks[0]), vec!["Two", "Mover", "Three"]);

    let again = service.normalize_card_order(&weeks[0]).unwrap();
    assert_eq!(again, BoardChange::Unchanged);
}

#[test]
fn normalize_unknown_week_is_not_found() {
    let (mut service, _) = setup();
    let err = service.normalize_card_order("ghost").unwrap_err();
    assert!(matches!(err, BoardError::NotFound(EntityRef::Week(_))));
}
