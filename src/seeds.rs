//! Built-in demo lesson, used when no lesson file is configured.

use crate::catalog::CatalogError;
use crate::config::{Lesson, LessonFile};
use crate::domain::{Blank, Choice, Exercise, ExerciseKind, Pair, ReorderItem};

fn choice(id: &str, text: &str) -> Choice {
  Choice { id: id.into(), text: text.into() }
}

fn item(id: &str, text: &str) -> ReorderItem {
  ReorderItem { id: id.into(), text: text.into() }
}

fn pair(id: &str, left: &str, right: &str) -> Pair {
  Pair { id: id.into(), left: left.into(), right: right.into() }
}

/// Five short Python exercises, one of each variant plus a closing question.
pub fn demo_exercises() -> Vec<Exercise> {
  vec![
    Exercise {
      id: "py-print".into(),
      concept: "print() sends text to the terminal so you can see what your program is doing.".into(),
      prompt: "What does print(\"hi\") do?".into(),
      explanation: "print writes its arguments to standard output, followed by a newline.".into(),
      xp_reward: 10,
      kind: ExerciseKind::MultipleChoice {
        options: vec![
          choice("a", "Shows hi on the screen"),
          choice("b", "Saves hi to a file"),
          choice("c", "Waits for the user to type hi"),
        ],
        correct_id: "a".into(),
      },
    },
    Exercise {
      id: "py-def".into(),
      concept: "Functions bundle code under a name. They start with def and hand back a value with return.".into(),
      prompt: "Complete the function so it returns a greeting.".into(),
      explanation: "def declares the function; return hands the greeting back to the caller.".into(),
      xp_reward: 15,
      kind: ExerciseKind::FillInBlank {
        code_lines: vec![
          "{{keyword}} greet(name):".into(),
          "    {{give_back}} \"Hello, \" + name".into(),
        ],
        blanks: vec![
          Blank { id: "keyword".into(), correct_answer: "def".into() },
          Blank { id: "give_back".into(), correct_answer: "return".into() },
        ],
        distractors: vec!["func".into(), "print".into(), "yield".into()],
      },
    },
    Exercise {
      id: "py-loop".into(),
      concept: "A for loop repeats its indented body once per value of the range.".into(),
      prompt: "Put the lines in order so the program prints 3.".into(),
      explanation: "Initialise total first, loop over range(3) adding each i, then print after the loop.".into(),
      xp_reward: 15,
      kind: ExerciseKind::Reorder {
        items: vec![
          item("init", "total = 0"),
          item("loop", "for i in range(3):"),
          item("body", "    total += i"),
          item("show", "print(total)"),
        ],
        correct_order: vec!["init".into(), "loop".into(), "body".into(), "show".into()],
      },
    },
    Exercise {
      id: "py-collections".into(),
      concept: "Python ships four everyday collection types.".into(),
      prompt: "Match each type with its description.".into(),
      explanation: "Lists and tuples keep order (only lists can change), dicts map keys to values, sets keep unique items.".into(),
      xp_reward: 20,
      kind: ExerciseKind::MatchingPairs {
        pairs: vec![
          pair("list", "list", "Ordered sequence you can change"),
          pair("tuple", "tuple", "Ordered sequence that cannot change"),
          pair("dict", "dict", "Maps keys to values"),
          pair("set", "set", "Unordered group of unique items"),
        ],
      },
    },
    Exercise {
      id: "py-len".into(),
      concept: "len() counts the items in a collection.".into(),
      prompt: "What is len([4, 5, 6])?".into(),
      explanation: "The list holds three items, so len returns 3.".into(),
      xp_reward: 10,
      kind: ExerciseKind::MultipleChoice {
        options: vec![choice("two", "2"), choice("three", "3"), choice("fifteen", "15")],
        correct_id: "three".into(),
      },
    },
  ]
}

pub fn demo_lesson_file() -> LessonFile {
  LessonFile {
    title: "Python in five minutes".into(),
    description: "Try a real lesson before signing up: five quick exercises, three lives.".into(),
    exercises: demo_exercises(),
  }
}

/// The demo lesson, validated like any configured lesson.
pub fn demo_lesson() -> Result<Lesson, CatalogError> {
  Lesson::try_from(demo_lesson_file())
}
