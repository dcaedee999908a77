use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Category {
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub keywords: &'static [&'static str],
}

pub const CATEGORIES: &[Category] = &[
    Category {
        name: "Motivation",
        description: "Quotes to inspire and motivate",
        icon: "🚀",
        keywords: &[
            "motivation", "inspire", "success", "achieve", "goal", "dream", "ambition",
            "determination",
        ],
    },
    Category {
        name: "Love & Relationships",
        description: "Quotes about love, friendship, and relationships",
        icon: "❤️",
        keywords: &[
            "love", "relationship", "friendship", "heart", "romance", "family", "together", "care",
        ],
    },
    Category {
        name: "Wisdom",
        description: "Timeless wisdom and life lessons",
        icon: "🧠",
        keywords: &[
            "wisdom", "knowledge", "learn", "experience", "truth", "understanding", "insight",
            "philosophy",
        ],
    },
    Category {
        name: "Happiness",
        description: "Quotes about joy, positivity, and happiness",
        icon: "😊",
        keywords: &[
            "happiness", "joy", "smile", "positive", "cheerful", "optimism", "gratitude",
            "blessed",
        ],
    },
    Category {
        name: "Life",
        description: "Reflections on life and living",
        icon: "🌱",
        keywords: &[
            "life", "living", "existence", "journey", "path", "growth", "change", "time",
        ],
    },
    Category {
        name: "Success",
        description: "Quotes about achievement and success",
        icon: "🏆",
        keywords: &[
            "success", "achievement", "victory", "win", "accomplish", "excel", "triumph",
            "progress",
        ],
    },
];

/// Case-insensitive lookup by display name.
pub fn find_category(name: &str) -> Option<&'static Category> {
    let name = name.trim();
    CATEGORIES.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_six_categories() {
        assert_eq!(CATEGORIES.len(), 6);
        assert!(CATEGORIES.iter().all(|c| c.keywords.len() == 8));
    }

    #[test]
    fn test_find_category() {
        assert_eq!(find_category("love & relationships").map(|c| c.icon), Some("❤️"));
        assert!(find_category("Sports").is_none());
    }
}
