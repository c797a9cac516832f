//! Properties of the rubric compiler.

use essay_grader::{
    GradeError, GradeLevel, GradingContext, Leniency, Rubric, RubricCriterion, prompt,
};

fn example_context() -> GradingContext {
    GradingContext::builder()
        .grade_level(GradeLevel::MiddleSchool)
        .leniency(Leniency::from_ratio(0.5).expect("ratio in range"))
        .rubric(vec![
            RubricCriterion::new("Grammar", 30.0, "clarity of sentence structure"),
            RubricCriterion::new("Argument", 70.0, "strength of thesis"),
        ])
        .build()
}

#[test]
fn compiling_is_deterministic() {
    let context = example_context();
    let first = prompt::compile(&context).expect("compile");
    let second = prompt::compile(&context.clone()).expect("compile");
    assert_eq!(first, second);
}

#[test]
fn example_rubric_mentions_criteria_grade_level_and_leniency() {
    let text = prompt::compile(&example_context()).expect("compile");

    assert!(text.contains("Grammar"));
    assert!(text.contains("Argument"));
    assert!(text.contains("GRADE LEVEL: Middle School (6-8)"));
    assert!(text.contains("GRADING APPROACH: BALANCED"));
    assert!(text.contains("LENIENCY: 5/10 (Balanced)"));
}

#[test]
fn every_criterion_appears_once_in_input_order() {
    let rubric: Rubric = vec![
        RubricCriterion::new("Zeta Voice", 10.0, "distinct zeta personality"),
        RubricCriterion::new("Alpha Evidence", 40.0, "alpha quotes support claims"),
        RubricCriterion::new("Mid Flow", 50.0, "mid paragraphs connect"),
    ]
    .into();
    let context = GradingContext::builder()
        .grade_level(GradeLevel::Graduate)
        .leniency(Leniency::new(9).unwrap())
        .rubric(rubric.clone())
        .build();
    let text = prompt::compile(&context).expect("compile");

    let mut last = 0;
    for criterion in &rubric {
        assert_eq!(text.matches(criterion.name.as_str()).count(), 1, "{}", criterion.name);
        assert_eq!(
            text.matches(criterion.description.as_str()).count(),
            1,
            "{}",
            criterion.description
        );
        let at = text.find(criterion.name.as_str()).unwrap();
        assert!(at > last, "{} is out of order", criterion.name);
        last = at;
    }
}

#[test]
fn leniency_and_grade_level_change_the_prompt() {
    let strict = GradingContext::builder()
        .leniency(Leniency::new(1).unwrap())
        .rubric(Rubric::essay_default())
        .build();
    let lenient = GradingContext {
        leniency: Leniency::new(10).unwrap(),
        ..strict.clone()
    };
    let strict_text = prompt::compile(&strict).unwrap();
    let lenient_text = prompt::compile(&lenient).unwrap();

    assert!(strict_text.contains("GRADING APPROACH: VERY STRICT"));
    assert!(lenient_text.contains("GRADING APPROACH: VERY LENIENT"));
    assert!(strict_text.contains("GRADE LEVEL: Elementary School (K-2)"));
    assert!(strict_text.contains("DO NOT expect complex vocabulary"));
}

#[test]
fn empty_rubric_is_refused() {
    let context = GradingContext::builder().rubric(Rubric::default()).build();
    assert!(matches!(prompt::compile(&context), Err(GradeError::EmptyRubric)));
}
