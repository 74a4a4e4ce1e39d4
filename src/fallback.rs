// src/fallback.rs
//! Hard-coded sample articles served when neither live feeds nor the cache
//! have anything for a category.

use chrono::{DateTime, Duration, Utc};

use crate::classify::{Category, ClassifiedItem, TrustTier};
use crate::dedup::PublishedArticle;
use crate::ingest::item_id;
use crate::ingest::types::RawItem;

pub const FALLBACK_SOURCE_ID: &str = "matchday_desk";
pub const FALLBACK_SOURCE_NAME: &str = "Matchday Desk";

struct Sample {
    category: Category,
    title: &'static str,
    summary: &'static str,
    slug: &'static str,
    hours_ago: i64,
}

const SAMPLES: &[Sample] = &[
    Sample {
        category: Category::Transfer,
        title: "Transfer window: clubs finalise late deals before the deadline",
        summary: "Several Premier League sides are working on loan and permanent deals as the window enters its final days.",
        slug: "transfer-window-late-deals",
        hours_ago: 1,
    },
    Sample {
        category: Category::Transfer,
        title: "Contract talks continue as midfielder weighs up his options",
        summary: "Negotiations over a new contract are ongoing, with personal terms and the length of the deal still to be agreed.",
        slug: "midfielder-contract-talks",
        hours_ago: 3,
    },
    Sample {
        category: Category::Transfer,
        title: "Loan market heats up for young forwards seeking minutes",
        summary: "Academy graduates across Europe are being lined up for season-long loan moves to gain first-team experience.",
        slug: "loan-market-young-forwards",
        hours_ago: 6,
    },
    Sample {
        category: Category::Injury,
        title: "Injury update: defender ruled out for three weeks with hamstring strain",
        summary: "The centre-back will miss the next round of league fixtures while completing his rehabilitation programme.",
        slug: "defender-hamstring-strain",
        hours_ago: 2,
    },
    Sample {
        category: Category::Injury,
        title: "Goalkeeper returns to training after ankle setback",
        summary: "Medical staff are managing his workload carefully ahead of the weekend.",
        slug: "goalkeeper-ankle-setback",
        hours_ago: 5,
    },
    Sample {
        category: Category::Injury,
        title: "Knee surgery successful for winger, recovery timeline unclear",
        summary: "The club expects the winger to be sidelined for several months following the procedure.",
        slug: "winger-knee-surgery",
        hours_ago: 9,
    },
    Sample {
        category: Category::Match,
        title: "Late penalty earns hard-fought victory in the derby",
        summary: "A stoppage-time spot kick settled a tense derby after a goalless first half.",
        slug: "derby-late-penalty",
        hours_ago: 1,
    },
    Sample {
        category: Category::Match,
        title: "Match preview: lineup news and key battles ahead of kick-off",
        summary: "Both managers have selection decisions to make before Saturday's fixture.",
        slug: "match-preview-lineup",
        hours_ago: 4,
    },
    Sample {
        category: Category::Match,
        title: "Highlights: five goals and a red card in an end-to-end draw",
        summary: "A dramatic afternoon ended level after both sides traded goals in the second half.",
        slug: "five-goal-draw-highlights",
        hours_ago: 8,
    },
    Sample {
        category: Category::General,
        title: "Manager press conference: focus on squad rotation this week",
        summary: "The head coach spoke about managing a congested fixture list and giving chances to academy players.",
        slug: "manager-press-conference",
        hours_ago: 2,
    },
    Sample {
        category: Category::General,
        title: "Stadium expansion plans approved by the local council",
        summary: "The club's board welcomed the decision, which will add several thousand seats over the next two seasons.",
        slug: "stadium-expansion-approved",
        hours_ago: 7,
    },
    Sample {
        category: Category::General,
        title: "League announces revised schedule for the festive period",
        summary: "Broadcast picks and kick-off times have been confirmed for the busy holiday programme.",
        slug: "festive-schedule",
        hours_ago: 12,
    },
];

/// Sample set for `category` (`All` returns every sample), newest first.
pub fn fallback_articles(category: Category, now: DateTime<Utc>) -> Vec<PublishedArticle> {
    let mut out: Vec<PublishedArticle> = SAMPLES
        .iter()
        .filter(|s| category == Category::All || s.category == category)
        .map(|s| to_article(s, now))
        .collect();
    out.sort_by(|a, b| b.article.raw.published_at.cmp(&a.article.raw.published_at));
    out
}

fn to_article(s: &Sample, now: DateTime<Utc>) -> PublishedArticle {
    let link = format!("https://matchday.local/samples/{}", s.slug);
    PublishedArticle {
        article: ClassifiedItem {
            raw: RawItem {
                id: item_id(&link, s.title),
                source_id: FALLBACK_SOURCE_ID.to_string(),
                source_name: FALLBACK_SOURCE_NAME.to_string(),
                title: s.title.to_string(),
                summary: Some(s.summary.to_string()),
                link,
                published_at: now - Duration::hours(s.hours_ago),
                image_url: None,
            },
            category: s.category,
            trust_score: 50,
            trust_tier: TrustTier::Reliable,
            matched_journalist: None,
        },
        duplicate_count: 0,
        duplicate_sources: Vec::new(),
    }
}
