//! Built-in content: the canonical game catalog, answer keys, assessment item tables and demo
//! roster names.
//!
//! A TOML catalog (see `config::AppConfig::content_path`) can replace the games; either way
//! the result goes through `Catalog::new` validation before anything is served.

use crate::domain::{
  AnswerKey, AuditoryProcessingData, BingoCard, GameCategory, GameDefinition, GamePayload, Story,
  WordData,
};

fn word(w: &str) -> WordData {
  WordData {
    word: w.to_string(),
    letters: w.to_lowercase().chars().map(String::from).collect(),
    image: None,
  }
}

fn strings(items: &[&str]) -> Vec<String> {
  items.iter().map(|s| s.to_string()).collect()
}

fn game(name: &str, slug: &str, payload: GamePayload) -> GameDefinition {
  GameDefinition { name: name.into(), slug: slug.into(), answer_key: None, payload }
}

fn word_building(name: &str, slug: &str, words: &[&str]) -> GameDefinition {
  game(name, slug, GamePayload::WordBuilding { words: words.iter().map(|w| word(w)).collect() })
}

fn word_list(name: &str, slug: &str, words: &[&str]) -> GameDefinition {
  game(name, slug, GamePayload::WordList { words: strings(words) })
}

fn story(name: &str, slug: &str, sentences: &[&str]) -> GameDefinition {
  game(name, slug, GamePayload::Story { story: Story { sentences: strings(sentences), images: vec![] } })
}

fn auditory(name: &str, slug: &str, letters: &[&str], correct: &[&str]) -> GameDefinition {
  game(
    name,
    slug,
    GamePayload::AuditoryProcessing {
      auditory: AuditoryProcessingData {
        letters: strings(letters),
        correct_words: strings(correct),
        slot_count: 3,
      },
    },
  )
}

fn bingo(name: &str, slug: &str, cards: &[[[&str; 4]; 5]]) -> GameDefinition {
  let cards = cards
    .iter()
    .map(|grid| BingoCard { grid: grid.iter().map(|row| strings(row)).collect() })
    .collect();
  game(name, slug, GamePayload::SoundBingo { cards })
}

/// The full game catalog in sidebar order.
pub fn seed_categories() -> Vec<GameCategory> {
  vec![
    GameCategory {
      name: "Word Building".into(),
      games: vec![
        word_building("The Fat Cat Sat", "build-fat-cat-sat", &["cat", "fat", "cap", "mop", "top", "cop", "map", "tap"]),
        word_building("The Bug on Jug", "build-bug-on-jug", &["BUG", "JUG", "DIG", "BIG", "RIG", "RUG", "HUG", "JIG"]),
        word_building("The Ben Bun", "build-ben-bun", &["WET", "ZIP", "WEB", "MUTT", "BUN", "NET", "VET", "BELL"]),
      ],
    },
    GameCategory {
      name: "Word List".into(),
      games: vec![
        word_list("Fat Cat Sat Word List", "list-fat-cat-sat", &[
          "mat", "fat", "cat", "cot", "cop", "pot", "pat", "map", "sat", "mop",
          "sap", "sop", "tap", "sap", "top",
        ]),
        word_list("Bug on Jug Word List", "list-bug-on-jug", &[
          "rug", "hug", "bug", "hag", "dug", "bag", "dig", "bad", "rig", "bud", "big", "jig", "mug", "jug", "gig",
          "tip", "pit", "gum", "hit", "Gus", "gab", "sip", "jab", "hiss", "job", "hip", "rip", "hat", "rat", "gas",
          "rag", "dot", "dog", "hill", "rat", "Jill", "hog", "mad", "hot",
        ]),
        word_list("Ben Bun Word List", "list-ben-bun", &[
          "bell", "let", "net", "bun", "nut", "but", "buzz", "fuzz", "wet", "fun", "web", "zip", "vet", "mutt",
          "Sall", "tell", "pet", "jam", "nap", "wig", "wag", "nod", "sun", "feel", "pass", "met", "fell", "will",
          "Ted", "get", "zap", "lip", "lap", "zig", "zag", "bit",
        ]),
      ],
    },
    GameCategory {
      name: "Reading Stories".into(),
      games: vec![
        story("Fat Cat Story", "story-fat-cat", &[
          "Fat cat sat on a mat.",
          "Fat cat sat on a map.",
          "Fat cat sat on a mop.",
          "Fat cat sat on a cop.",
          "Fat cat sat on Pat.",
        ]),
        story("Bug on Jug Story", "story-bug-on-jug", &[
          "Big bug dug",
          "Big bug dug up a jug",
          "Big bug did hug a jug",
          "Big bug did jig on a jug",
          "Big bug did sit on a jug.",
        ]),
        story("Ben Bun Story", "story-ben-bun", &[
          "Ben Bun is wet.",
          "Buzz... Ben Bun got bit.",
          "Ben Bun is in a net.",
          "Ben Bun is at a vet.",
        ]),
      ],
    },
    GameCategory {
      name: "Final Activity".into(),
      games: vec![
        story("Mad Cat", "story-mad-cat", &[
          "A cat is mad. A dog but him. It is bad to nip at a cat.",
          "A dog ran. A cat ran. Get a dog! Get a bad dog!",
          "It is not a bad dog. It is a pet. It is Dan's pet. It is Sal. \"Get on Sal!\"",
          "Sal got on. It is a hill. It is a big hill.",
          "Dan and Sal got up a hill.",
          "On top is Mom.",
          "Mom is mad at a cat. It is bad to hiss at Sal.",
          "The End.",
        ]),
        story("Missing Cat", "story-missing-cat", &[
          "Jan had a nap on a bed. Jan is up.",
          "Jan is sad. Tom cat is not on his mat. Tom cat is not on his cot.",
          "It is a bad cat. It did not get a nap. It got off his cot.",
          "Jan got on. Jan got up a hill.",
          "\"Tom! Tom cat!\" It is a hiss. It is a cat. It is Tom. \"Bad cat did not get a nap.\"",
          "Jan got Tom cat in a box.",
          "Tom cat is sad in a box.",
          "Jan got Tom on his cot. \"Get a nap Tom. Get a nap on a cot.\"",
        ]),
        story("Fun in the Sun", "story-fun-in-the-sun", &[
          "Jan is in bed. It is Mom. \"Get up Jan!\"",
          "\"Sun is up! It is fun.\"",
          "Jan sat up. Sun is up.",
          "Tom sat up. Tom got off his cot. Get a sip Jan. Get a sip Tom. \"Yum!\"",
          "\"Tom, it is a bad dog and his kid. It is a dog that bit Tom.\"",
          "Jan hid Tom in a bag. Tom is sad. It is bad in a bag.",
          "Sal did kiss Tom. It is not a bad dog, it is a bad bag.",
          "Dan and Jan and Tom and Sal did run in sun. It is fun!",
        ]),
      ],
    },
    GameCategory {
      name: "Auditory Processing".into(),
      games: vec![
        auditory(
          "Fat Cat Sat",
          "auditory-fat-cat-sat",
          &["o", "t", "p", "c", "a", "f", "m", "s", "p"],
          &["cot", "pot", "pat", "fat", "mat", "cat", "sat", "sap", "tap", "cap", "map", "mop", "sop", "cop", "top", "pop"],
        ),
        auditory(
          "Bug on Jug",
          "auditory-bug-on-jug",
          &["b", "u", "r", "g", "h", "j", "i", "d"],
          &["rug", "bug", "dug", "dig", "rig", "big", "jig", "jug", "hug", "bud"],
        ),
        // "let" needs a plain "l" tile next to the "ll" grapheme.
        auditory(
          "Ben Bun",
          "auditory-ben-bun",
          &["e", "e", "t", "w", "u", "b", "n", "v", "l", "zz", "ll"],
          &["let", "wet", "vet", "net", "nut", "but", "buzz", "bun", "Ben", "bell"],
        ),
      ],
    },
    GameCategory {
      name: "Sound Bingo".into(),
      games: vec![
        bingo("Fat Cat", "bingo-fat-cat", &[
          [["f", "f", "p", "m"], ["p", "p", "m", "c"], ["a", "s", "a", "s"], ["m", "f", "s", "a"], ["s", "a", "c", "f"]],
          [["a", "f", "o", "t"], ["f", "a", "f", "m"], ["f", "a", "t", "m"], ["c", "c", "m", "a"], ["p", "p", "c", "m"]],
        ]),
        bingo("Bug on Jug", "bingo-bug-on-jug", &[
          [["u", "p", "a", "t"], ["g", "u", "o", "s"], ["p", "s", "j", "c"], ["r", "h", "b", "d"], ["b", "p", "u", "m"]],
          [["f", "r", "s", "m"], ["a", "b", "t", "o"], ["g", "f", "j", "i"], ["p", "b", "m", "s"], ["j", "d", "u", "p"]],
        ]),
        bingo("Ben Bun", "bingo-ben-bun", &[
          [["u", "p", "e", "t"], ["g", "n", "w", "i"], ["l", "z", "j", "c"], ["r", "h", "b", "d"], ["b", "p", "n", "v"]],
          [["f", "r", "w", "m"], ["e", "l", "t", "o"], ["g", "f", "j", "i"], ["p", "b", "v", "s"], ["j", "d", "u", "z"]],
        ]),
      ],
    },
  ]
}

/// Answer keys, first entry is the fallback for unknown slugs.
pub fn seed_answer_keys() -> Vec<AnswerKey> {
  fn key(slug: &str, title: &str, left: &[&str], right: &[&str]) -> AnswerKey {
    AnswerKey {
      slug: slug.into(),
      title: title.into(),
      columns: vec![strings(left), strings(right)],
    }
  }
  vec![
    key(
      "fat-cat-sat",
      "Fat Cat Sat",
      &["cot", "pot", "pat", "fat", "mat", "cat", "sat", "sap"],
      &["tap", "cap", "map", "mop", "sop", "cop", "top", "pop"],
    ),
    key("bug-on-jug", "Bug on Jug", &["rug", "bug", "dug", "dig", "rig"], &["big", "jig", "jug", "hug"]),
    key("ben-bun", "Ben Bun", &["let", "wet", "vet", "net", "nut"], &["but", "buzz", "bun", "Ben", "bell"]),
  ]
}

/// Blending prompts by part.
pub static BLENDING_ITEMS: [(u8, &[&str]); 2] = [
  (1, &["pig", "bug", "hat", "pin", "rat", "bird", "shell", "five", "boat"]),
  (2, &["frog", "grass", "stick", "print", "crunch", "plant"]),
];

/// Phoneme segmentation prompts by part. Part 3 is nonsense words.
pub static SEGMENTATION_ITEMS: [(u8, &[&str]); 3] = [
  (1, &["dog", "hat", "pin", "pot", "rat", "nut"]),
  (2, &["frog", "black", "nest", "trip", "hand", "drum"]),
  (3, &["pim", "mif", "sep", "prif", "sept"]),
];

/// Auditory deletion rows: (part, base word, removed grapheme, expected answer).
/// `expected` is authoritative; it is not derived from the other two.
pub static DELETION_ITEMS: [(u8, &str, &str, &str); 10] = [
  (1, "pim", "p", "im"),
  (1, "tog", "g", "to"),
  (1, "sip", "s", "ip"),
  (2, "stop", "s", "top"),
  (2, "nest", "t", "nes"),
  (2, "flag", "f", "lag"),
  (3, "plum", "l", "pum"),
  (3, "best", "s", "bet"),
  (3, "grill", "r", "gill"),
  (3, "lost", "s", "lot"),
];

/// Code-knowledge graphemes in their three display columns, each with cue words.
pub static CODE_COLUMNS: [&[(&str, &str)]; 3] = [
  &[
    ("b", "boy"), ("c", "cat / city"), ("d", "dog"), ("f", "fat"), ("g", "got / gentle"),
    ("h", "hop"), ("j", "job"), ("k", "kid"), ("l", "lap"), ("m", "mop"), ("n", "nod"),
    ("p", "pat"), ("r", "rat"), ("s", "sat"), ("t", "top"), ("v", "give"), ("w", "with"),
  ],
  &[
    ("x", "fox 'ks' / exit 'gz'"), ("y", "yes / happy / fly"), ("z", "zipper"), ("i", "rip"),
    ("e", "net"), ("a", "mat"), ("o", "mop"), ("u", "nut"), ("sh", "ship"), ("ch", "chip"),
    ("th", "this / Thursday"), ("ck", "duck"), ("qu", "quick 'kw'"), ("ce", "nice"), ("ai", "rain"),
    ("ou", "out / group / touch"), ("ea", "each / steak / bread"),
  ],
  &[
    ("oa", "boat"), ("ow", "now / straw"), ("igh", "right"), ("eigh", "eight / height"),
    ("ay", "play"), ("ie", "die / chief"), ("aw", "saw"), ("ee", "seen"), ("ey", "key / they"),
    ("ue", "blue / clue"), ("ew", "few / new"), ("au", "August"), ("oo", "wood / mood"),
    ("ui", "suit"), ("oy", "boy"), ("oi", "soil"),
  ],
];

/// Demo roster, inserted only when `seed_roster = true`.
pub fn seed_student_names() -> &'static [&'static str] {
  &[
    "John Mark Dizon",
    "Angela Bautista",
    "Christian Reyes",
    "Nicole Dela Cruz",
    "Joshua Santos",
    "Patricia Mendoza",
    "Kevin Ramirez",
    "Althea Garcia",
    "Jerome Villanueva",
    "Hannah Cruz",
  ]
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  #[test]
  fn code_checklist_has_fifty_distinct_graphemes() {
    let all: Vec<&str> = CODE_COLUMNS.iter().flat_map(|c| c.iter().map(|(g, _)| *g)).collect();
    assert_eq!(all.len(), 50);
    assert_eq!(all.iter().collect::<HashSet<_>>().len(), 50);
  }

  #[test]
  fn deletion_prompts_are_distinct() {
    let bases: HashSet<&str> = DELETION_ITEMS.iter().map(|(_, base, _, _)| *base).collect();
    assert_eq!(bases.len(), DELETION_ITEMS.len());
  }
}
