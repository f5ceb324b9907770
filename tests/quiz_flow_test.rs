mod common;

use common::{create_test_db, create_user, make_questions, quiz_service, TIMEOUT};
use quizmaster::error::Error;
use quizmaster::models::{CategorySelector, Question, Rarity};
use quizmaster::services::gacha::GachaService;
use quizmaster::services::ledger::{LedgerService, QuizReward};

#[tokio::test]
async fn alice_plays_a_history_quiz_to_the_end() {
    let db = create_test_db().await;
    let alice = create_user(&db, "alice").await;
    db.create_category(alice.id, "History", &make_questions(12))
        .await
        .unwrap();
    let quizzes = quiz_service(&db);

    let quiz = quizzes
        .get_or_create_quiz(&alice, &CategorySelector::bank("History"))
        .await
        .unwrap();
    assert_eq!(quiz.question_count(), 10);
    assert_eq!(quiz.current_index, 0);
    assert!(!quiz.finished);

    for (i, question) in quiz.questions.iter().enumerate() {
        let answer = if i < 7 {
            question.response_correct.clone()
        } else {
            "definitely wrong".to_string()
        };
        let outcome = quizzes
            .submit_answer(&alice, &quiz.id, &answer)
            .await
            .unwrap();

        assert_eq!(outcome.correct, i < 7);
        assert_eq!(outcome.finished, i == 9);

        let stored = db.quiz(&quiz.id).await.unwrap().unwrap();
        assert_eq!(stored.finished, stored.current_index == stored.question_count());
    }

    let profile = db.profile("alice").await.unwrap().unwrap();
    assert_eq!(profile.coins, 170);
    assert_eq!(profile.experience, 17);
    assert_eq!(profile.stats.quizzes_played, 1);
    assert_eq!(profile.stats.correct_responses, 7);
    assert_eq!(profile.stats.full_marks, 0);

    let stored = db.quiz(&quiz.id).await.unwrap().unwrap();
    assert!(stored.finished);
    assert_eq!(stored.correct_count, 7);
}

#[tokio::test]
async fn get_or_create_is_idempotent_while_active() {
    let db = create_test_db().await;
    let alice = create_user(&db, "alice").await;
    db.create_category(alice.id, "History", &make_questions(10))
        .await
        .unwrap();
    let quizzes = quiz_service(&db);
    let selector = CategorySelector::bank("History");

    let first = quizzes.get_or_create_quiz(&alice, &selector).await.unwrap();
    let second = quizzes.get_or_create_quiz(&alice, &selector).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.questions, second.questions);
}

#[tokio::test]
async fn snapshot_ignores_later_bank_edits() {
    let db = create_test_db().await;
    let alice = create_user(&db, "alice").await;
    db.create_category(alice.id, "History", &make_questions(10))
        .await
        .unwrap();
    let quizzes = quiz_service(&db);

    let quiz = quizzes
        .get_or_create_quiz(&alice, &CategorySelector::bank("History"))
        .await
        .unwrap();
    db.add_question(alice.id, "History", &common::make_question(99))
        .await
        .unwrap();

    let reloaded = quizzes.get_quiz(&alice, &quiz.id).await.unwrap();
    assert_eq!(reloaded.questions, quiz.questions);
}

#[tokio::test]
async fn small_bank_is_insufficient_content() {
    let db = create_test_db().await;
    let alice = create_user(&db, "alice").await;
    db.create_category(alice.id, "History", &make_questions(4))
        .await
        .unwrap();

    let err = quiz_service(&db)
        .get_or_create_quiz(&alice, &CategorySelector::bank("History"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::InsufficientContent {
            available: 4,
            required: 10
        }
    ));
    assert!(db.active_quiz(alice.id).await.unwrap().is_none());
}

#[tokio::test]
async fn missing_category_is_not_found() {
    let db = create_test_db().await;
    let alice = create_user(&db, "alice").await;

    let err = quiz_service(&db)
        .get_or_create_quiz(&alice, &CategorySelector::bank("Nowhere"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::CategoryNotFound(_)));
}

#[tokio::test]
async fn finished_quiz_rejects_further_answers() {
    let db = create_test_db().await;
    let alice = create_user(&db, "alice").await;
    db.create_category(alice.id, "History", &make_questions(10))
        .await
        .unwrap();
    let quizzes = quiz_service(&db);
    let quiz = quizzes
        .get_or_create_quiz(&alice, &CategorySelector::bank("History"))
        .await
        .unwrap();

    for question in &quiz.questions {
        quizzes
            .submit_answer(&alice, &quiz.id, &question.response_correct)
            .await
            .unwrap();
    }

    let err = quizzes
        .submit_answer(&alice, &quiz.id, "anything")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::QuizAlreadyFinished));

    let stored = db.quiz(&quiz.id).await.unwrap().unwrap();
    assert_eq!(stored.current_index, 10);
    assert_eq!(stored.correct_count, 10);

    let profile = db.profile("alice").await.unwrap().unwrap();
    assert_eq!(profile.coins, 200);
    assert_eq!(profile.stats.full_marks, 1);
    assert_eq!(profile.stats.quizzes_played, 1);
}

#[tokio::test]
async fn legendary_hint_on_two_choice_question_reveals_one_answer() {
    let db = create_test_db().await;
    let alice = create_user(&db, "alice").await;
    let questions: Vec<Question> = (0..10)
        .map(|i| Question {
            question_text: format!("True or false {i}?"),
            responses: vec!["True".to_string(), "False".to_string()],
            response_correct: "True".to_string(),
            category: None,
        })
        .collect();
    db.create_category(alice.id, "Logic", &questions).await.unwrap();
    db.increment_inventory(alice.id, Rarity::Legendary, 2)
        .await
        .unwrap();
    let quizzes = quiz_service(&db);
    let quiz = quizzes
        .get_or_create_quiz(&alice, &CategorySelector::bank("Logic"))
        .await
        .unwrap();

    let hints = quizzes.redeem_hint(&alice, &quiz.id, 5).await.unwrap();

    assert_eq!(hints, vec!["False".to_string()]);
    let profile = db.profile("alice").await.unwrap().unwrap();
    assert_eq!(profile.quantity(Rarity::Legendary), 1);
    assert_eq!(profile.stats.used_cheat_sheets, 1);
}

#[tokio::test]
async fn hint_without_stock_changes_nothing() {
    let db = create_test_db().await;
    let alice = create_user(&db, "alice").await;
    db.create_category(alice.id, "History", &make_questions(10))
        .await
        .unwrap();
    let quizzes = quiz_service(&db);
    let quiz = quizzes
        .get_or_create_quiz(&alice, &CategorySelector::bank("History"))
        .await
        .unwrap();

    let err = quizzes.redeem_hint(&alice, &quiz.id, 4).await.unwrap_err();
    assert!(matches!(err, Error::InsufficientInventory(4)));

    let profile = db.profile("alice").await.unwrap().unwrap();
    assert_eq!(profile.quantity(Rarity::Rare), 0);
    assert_eq!(profile.stats.used_cheat_sheets, 0);
}

#[tokio::test]
async fn another_user_cannot_touch_the_quiz() {
    let db = create_test_db().await;
    let alice = create_user(&db, "alice").await;
    let mallory = create_user(&db, "mallory").await;
    db.create_category(alice.id, "History", &make_questions(10))
        .await
        .unwrap();
    db.increment_inventory(mallory.id, Rarity::Common, 1)
        .await
        .unwrap();
    let quizzes = quiz_service(&db);
    let quiz = quizzes
        .get_or_create_quiz(&alice, &CategorySelector::bank("History"))
        .await
        .unwrap();

    let err = quizzes.redeem_hint(&mallory, &quiz.id, 3).await.unwrap_err();
    assert!(matches!(err, Error::NotQuizOwner));
    let err = quizzes
        .submit_answer(&mallory, &quiz.id, "Correct 0")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotQuizOwner));

    let profile = db.profile("mallory").await.unwrap().unwrap();
    assert_eq!(profile.quantity(Rarity::Common), 1);
}

#[tokio::test]
async fn ten_pull_costs_exactly_nine_hundred() {
    let db = create_test_db().await;
    let alice = create_user(&db, "alice").await;
    let ledger = LedgerService::new(db.clone(), TIMEOUT);
    let gacha = GachaService::new(db.clone(), TIMEOUT);

    let err = gacha.pull(&alice, 10).await.unwrap_err();
    assert!(matches!(err, Error::InsufficientFunds { needed: 900 }));

    for _ in 0..5 {
        ledger
            .apply_quiz_completion(alice.id, &QuizReward::for_result(8, 10))
            .await
            .unwrap();
    }
    assert_eq!(ledger.profile("alice").await.unwrap().coins, 900);

    let drawn = gacha.pull(&alice, 10).await.unwrap();
    assert_eq!(drawn.len(), 10);

    let profile = ledger.profile("alice").await.unwrap();
    assert_eq!(profile.coins, 0);
    let total: i64 = Rarity::ALL.iter().map(|&r| profile.quantity(r)).sum();
    assert_eq!(total, 10);
    for rarity in Rarity::ALL {
        let drawn_of_rarity = drawn.iter().filter(|&&r| r == rarity).count() as i64;
        assert_eq!(profile.quantity(rarity), drawn_of_rarity);
    }
}

#[tokio::test]
async fn ledger_service_guards_balances() {
    let db = create_test_db().await;
    let alice = create_user(&db, "alice").await;
    let ledger = LedgerService::new(db.clone(), TIMEOUT);

    let err = ledger.spend_currency(alice.id, 1).await.unwrap_err();
    assert!(matches!(err, Error::InsufficientFunds { needed: 1 }));

    let err = ledger
        .decrement_inventory(alice.id, Rarity::Rare, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InsufficientInventory(4)));

    ledger
        .increment_inventory(alice.id, Rarity::Rare, 1)
        .await
        .unwrap();
    ledger
        .decrement_inventory(alice.id, Rarity::Rare, 1)
        .await
        .unwrap();
    assert_eq!(
        ledger.profile("alice").await.unwrap().quantity(Rarity::Rare),
        0
    );
}
