//! Fixed inputs sent upstream by the demo routes.

/// Sentences translated by both translation routes.
pub const SENTENCES: [&str; 10] = [
    "s2a is awesome",
    "zatar is great",
    "authentication is important",
    "mtls is a must",
    "google cloud is better than aws",
    "google cloud is better than azure",
    "how are you?",
    "good morning",
    "summer is the best",
    "I love Sunnyvale",
];

/// Target language of the gRPC translation route.
pub const GRPC_TARGET_LANGUAGE: &str = "zh";

/// Target language of the REST translation route.
pub const REST_TARGET_LANGUAGE: &str = "ar";

/// Daily top Google Search term in the US over the last week.
pub const TOP_TERMS_QUERY: &str = "\
-- This query shows a list of the daily top Google Search terms.
SELECT
   refresh_date AS Day,
   term AS Top_Term,
       -- These search terms are in the top 25 in the US each day.
 rank,
FROM `bigquery-public-data.google_trends.top_terms`
WHERE  rank = 1
       -- Choose only the top term each day.
 AND refresh_date >= DATE_SUB(CURRENT_DATE(), INTERVAL 1 WEEK)
       -- Filter to the last 1 weeks.
GROUP BY Day, Top_Term, rank
ORDER BY Day DESC";
