//! Penal Code (2015) article catalog used when entering charges

use serde::Serialize;

/// One article of the Penal Code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Article {
    pub article: u16,
    pub title: &'static str,
    pub description: &'static str,
}

impl Article {
    /// `Article <n>: <title>`, the form used in charges fields
    pub fn display(&self) -> String {
        format!("Article {}: {}", self.article, self.title)
    }

    fn matches(&self, query: &str) -> bool {
        let q = query.to_lowercase();
        self.article.to_string() == q.trim_start_matches("article").trim()
            || self.title.to_lowercase().contains(&q)
            || self.description.to_lowercase().contains(&q)
    }
}

impl std::fmt::Display for Article {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Article {}: {}", self.article, self.title)
    }
}

const ARTICLES: &[Article] = &[
    Article {
        article: 123,
        title: "Murder",
        description: "Killing another person",
    },
    Article {
        article: 134,
        title: "Intentional infliction of bodily harm",
        description: "Intentionally injuring or harming the health of another person",
    },
    Article {
        article: 141,
        title: "Rape",
        description: "Sexual intercourse against the will of the victim by force or threat",
    },
    Article {
        article: 168,
        title: "Robbery",
        description: "Using or threatening violence to appropriate property",
    },
    Article {
        article: 169,
        title: "Kidnapping for ransom",
        description: "Taking a person hostage to appropriate property",
    },
    Article {
        article: 170,
        title: "Extortion of property",
        description: "Threatening force or intimidation to obtain property",
    },
    Article {
        article: 171,
        title: "Snatching of property",
        description: "Openly and quickly seizing property from its holder",
    },
    Article {
        article: 172,
        title: "Open appropriation of property",
        description: "Openly taking property while the owner cannot prevent it",
    },
    Article {
        article: 173,
        title: "Theft of property",
        description: "Secretly appropriating property of another person",
    },
    Article {
        article: 174,
        title: "Obtaining property by fraud",
        description: "Deceiving the owner into handing over property",
    },
    Article {
        article: 175,
        title: "Abuse of trust to appropriate property",
        description: "Appropriating property received through a loan, rental or contract",
    },
    Article {
        article: 178,
        title: "Destruction of or damage to property",
        description: "Intentionally destroying or damaging property of another person",
    },
    Article {
        article: 249,
        title: "Illegal possession of narcotics",
        description: "Keeping narcotic substances without authorization",
    },
    Article {
        article: 250,
        title: "Illegal transportation of narcotics",
        description: "Moving narcotic substances from one place to another",
    },
    Article {
        article: 251,
        title: "Illegal trafficking in narcotics",
        description: "Buying, selling or exchanging narcotic substances",
    },
    Article {
        article: 255,
        title: "Organizing illegal use of narcotics",
        description: "Providing a place or means for others to use narcotics",
    },
    Article {
        article: 260,
        title: "Violations of road traffic regulations",
        description: "Traffic violations causing death, injury or serious damage",
    },
    Article {
        article: 304,
        title: "Illegal manufacturing or trading of military weapons",
        description: "Making, storing, transporting, using or trading military weapons",
    },
    Article {
        article: 318,
        title: "Disturbance of public order",
        description: "Causing public disorder that affects social security",
    },
    Article {
        article: 321,
        title: "Gambling",
        description: "Illegally gambling for money or property",
    },
    Article {
        article: 322,
        title: "Organizing gambling",
        description: "Organizing gambling or running a gambling den",
    },
    Article {
        article: 353,
        title: "Embezzlement of property",
        description: "Appropriating property one manages by virtue of position",
    },
    Article {
        article: 354,
        title: "Taking bribes",
        description: "Accepting benefits to act or not act in one's official capacity",
    },
    Article {
        article: 364,
        title: "Offering bribes",
        description: "Giving benefits to an official to influence their duties",
    },
];

/// Every article in the catalog, in article order
pub fn all() -> &'static [Article] {
    ARTICLES
}

pub fn lookup(article: u16) -> Option<&'static Article> {
    ARTICLES.iter().find(|a| a.article == article)
}

/// Articles whose number, title or description matches `query`
pub fn search(query: &str) -> Vec<&'static Article> {
    let query = query.trim();
    if query.is_empty() {
        return ARTICLES.iter().collect();
    }
    ARTICLES.iter().filter(|a| a.matches(query)).collect()
}
