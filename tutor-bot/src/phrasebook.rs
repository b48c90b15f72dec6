//! Static phrasebook: everyday topics with example phrases, built once and shared read-only.

/// One phrasebook topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub phrases: &'static [&'static str],
}

impl Topic {
    /// True when one of the query words is the topic name or a keyword.
    fn matches(&self, words: &[&str]) -> bool {
        words
            .iter()
            .any(|w| *w == self.name || self.keywords.iter().any(|k| k == w))
    }

    /// Topic heading followed by one phrase per line.
    pub fn render(&self) -> String {
        let mut out = format!("{}:", self.name);
        for phrase in self.phrases {
            out.push_str("\n- ");
            out.push_str(phrase);
        }
        out
    }
}

const BUILTIN_TOPICS: &[Topic] = &[
    Topic {
        name: "greetings",
        keywords: &["hello", "hi", "meet", "introduce"],
        phrases: &[
            "Hello! How are you?",
            "Nice to meet you.",
            "My name is Anna. What's your name?",
            "See you later!",
        ],
    },
    Topic {
        name: "shopping",
        keywords: &["shop", "buy", "price", "store", "cost"],
        phrases: &[
            "How much does this cost?",
            "Can I try it on?",
            "Do you have a smaller size?",
            "I'll take it, thank you.",
        ],
    },
    Topic {
        name: "restaurant",
        keywords: &["food", "eat", "menu", "order", "cafe"],
        phrases: &[
            "Can I see the menu, please?",
            "I would like a cup of coffee.",
            "Could we have the bill, please?",
            "Is there a table for two?",
        ],
    },
    Topic {
        name: "travel",
        keywords: &["airport", "hotel", "ticket", "train", "trip"],
        phrases: &[
            "Where is the train station?",
            "I have a reservation for two nights.",
            "What time does the flight leave?",
            "One ticket to London, please.",
        ],
    },
    Topic {
        name: "directions",
        keywords: &["where", "way", "street", "left", "right"],
        phrases: &[
            "Excuse me, how do I get to the museum?",
            "Go straight and turn left.",
            "Is it far from here?",
            "It's next to the bank.",
        ],
    },
    Topic {
        name: "weather",
        keywords: &["rain", "sun", "cold", "hot", "forecast"],
        phrases: &[
            "What's the weather like today?",
            "It's sunny and warm.",
            "It's going to rain tomorrow.",
            "Take an umbrella, it's cold outside.",
        ],
    },
    Topic {
        name: "work",
        keywords: &["job", "office", "meeting", "boss", "colleague"],
        phrases: &[
            "What do you do?",
            "I work as a nurse.",
            "I have a meeting at ten.",
            "Could you send me the report?",
        ],
    },
    Topic {
        name: "health",
        keywords: &["doctor", "sick", "pain", "medicine", "hospital"],
        phrases: &[
            "I don't feel well.",
            "I have a headache.",
            "I need to see a doctor.",
            "Take this medicine twice a day.",
        ],
    },
];

/// Immutable topic table. Lookups are linear scans.
#[derive(Debug, Clone)]
pub struct Phrasebook {
    topics: Vec<Topic>,
}

impl Phrasebook {
    /// The built-in everyday-English topics.
    pub fn builtin() -> Self {
        Self::new(BUILTIN_TOPICS.to_vec())
    }

    pub fn new(topics: Vec<Topic>) -> Self {
        Self { topics }
    }

    /// Topics whose name or keyword occurs as a word of `query` (case-insensitive), in table order.
    pub fn lookup(&self, query: &str) -> Vec<&Topic> {
        let query = query.to_lowercase();
        let words: Vec<&str> = query
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        if words.is_empty() {
            return Vec::new();
        }
        self.topics.iter().filter(|t| t.matches(&words)).collect()
    }

    pub fn topics(&self) -> Vec<&'static str> {
        self.topics.iter().map(|t| t.name).collect()
    }
}
