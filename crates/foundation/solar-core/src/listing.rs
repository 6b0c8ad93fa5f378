//! Visitor-side filtering and ranking.
//!
//! The fetched collection arrives ordered by rating descending. Filtering
//! borrows from it and never reorders or mutates it; ranks are positions in
//! the filtered sequence.

use crate::model::Installer;

/// Number of cards rendered ahead of the lead form.
pub const FEATURED_COUNT: usize = 3;

/// Case-insensitive substring match on name, description or any service label.
pub fn matches(installer: &Installer, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    matches_folded(installer, &needle)
}

fn matches_folded(installer: &Installer, needle: &str) -> bool {
    installer.name.to_lowercase().contains(needle)
        || installer.description.to_lowercase().contains(needle)
        || installer
            .services
            .iter()
            .any(|service| service.to_lowercase().contains(needle))
}

/// Installers matching `query`, in fetched order.
pub fn filter_installers<'a>(installers: &'a [Installer], query: &str) -> Vec<&'a Installer> {
    let needle = query.to_lowercase();
    installers
        .iter()
        .filter(|installer| matches_folded(installer, &needle))
        .collect()
}

/// Rank badge treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
    Standard,
}

impl Medal {
    pub fn for_rank(rank: usize) -> Self {
        match rank {
            1 => Medal::Gold,
            2 => Medal::Silver,
            3 => Medal::Bronze,
            _ => Medal::Standard,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Medal::Gold => "rank-gold",
            Medal::Silver => "rank-silver",
            Medal::Bronze => "rank-bronze",
            Medal::Standard => "rank-standard",
        }
    }
}

/// An installer with its 1-based position among the matches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedInstaller<'a> {
    pub rank: usize,
    pub installer: &'a Installer,
}

impl RankedInstaller<'_> {
    pub fn medal(&self) -> Medal {
        Medal::for_rank(self.rank)
    }
}

/// What the listing section renders for a given filter text.
#[derive(Debug, Clone, PartialEq)]
pub enum ListingLayout<'a> {
    /// Nothing to show and no filter text entered.
    NoInstallers,
    /// Filter text entered and nothing matches it.
    NoMatches,
    /// Featured cards, then the lead form, then the remaining cards.
    Ranked {
        featured: Vec<RankedInstaller<'a>>,
        remaining: Vec<RankedInstaller<'a>>,
    },
}

impl<'a> ListingLayout<'a> {
    pub fn build(installers: &'a [Installer], query: &str) -> Self {
        let matched = filter_installers(installers, query);
        if matched.is_empty() {
            return if query.is_empty() {
                ListingLayout::NoInstallers
            } else {
                ListingLayout::NoMatches
            };
        }

        let mut ranked = matched
            .into_iter()
            .enumerate()
            .map(|(idx, installer)| RankedInstaller {
                rank: idx + 1,
                installer,
            });
        let featured: Vec<_> = ranked.by_ref().take(FEATURED_COUNT).collect();
        let remaining: Vec<_> = ranked.collect();
        ListingLayout::Ranked {
            featured,
            remaining,
        }
    }

    /// Total number of matches.
    pub fn match_count(&self) -> usize {
        match self {
            ListingLayout::Ranked {
                featured,
                remaining,
            } => featured.len() + remaining.len(),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PriceTier;
    use chrono::Utc;

    fn installer(name: &str, description: &str, services: &[&str], rating: f64) -> Installer {
        Installer {
            id: name.to_lowercase().replace(' ', "-"),
            name: name.to_string(),
            description: description.to_string(),
            phone: "555-0100".to_string(),
            website: None,
            rating,
            years_in_business: 5,
            certifications: Vec::new(),
            services: services.iter().map(|s| s.to_string()).collect(),
            price_range: PriceTier::Moderate,
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn fetched() -> Vec<Installer> {
        vec![
            installer("Arbor Sun", "Residential installs", &["Residential Solar"], 4.9),
            installer("Volt Home", "Battery backup experts", &["EV Chargers"], 4.8),
            installer("Ypsi Power", "Commercial arrays", &["Battery Storage"], 4.6),
            installer("Battery Barn", "Storage only", &[], 4.4),
            installer("Dexter Roofing", "Roofs and panels", &["Roofing"], 4.1),
        ]
    }

    fn names<'a>(ranked: &[RankedInstaller<'a>]) -> Vec<&'a str> {
        ranked.iter().map(|r| r.installer.name.as_str()).collect()
    }

    #[test]
    fn match_covers_name_description_and_services() {
        let all = fetched();
        let matched: Vec<_> = filter_installers(&all, "BATTERY")
            .into_iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(matched, vec!["Volt Home", "Ypsi Power", "Battery Barn"]);
    }

    #[test]
    fn filter_is_exactly_the_predicate() {
        let all = fetched();
        for query in ["", "sol", "ROOF", "storage", "zzz", "e"] {
            let matched = filter_installers(&all, query);
            for installer in &all {
                let expected = matches(installer, query);
                let present = matched.iter().any(|m| m.id == installer.id);
                assert_eq!(expected, present, "query {query:?} installer {}", installer.name);
            }
        }
    }

    #[test]
    fn empty_query_preserves_fetched_order() {
        let all = fetched();
        let before = all.clone();
        let _ = filter_installers(&all, "battery");
        let again: Vec<_> = filter_installers(&all, "").into_iter().cloned().collect();
        assert_eq!(again, before);
    }

    #[test]
    fn top_three_precede_the_form() {
        let all = fetched();
        match ListingLayout::build(&all, "") {
            ListingLayout::Ranked {
                featured,
                remaining,
            } => {
                assert_eq!(names(&featured), vec!["Arbor Sun", "Volt Home", "Ypsi Power"]);
                assert_eq!(remaining.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![4, 5]);
                assert_eq!(featured[0].medal(), Medal::Gold);
                assert_eq!(remaining[0].medal(), Medal::Standard);
            }
            other => panic!("unexpected layout {other:?}"),
        }
    }

    #[test]
    fn ranks_follow_filtered_order() {
        let all = fetched();
        let layout = ListingLayout::build(&all, "battery");
        assert_eq!(layout.match_count(), 3);
        match layout {
            ListingLayout::Ranked {
                featured,
                remaining,
            } => {
                assert_eq!(featured.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
                assert_eq!(featured[2].installer.name, "Battery Barn");
                assert!(remaining.is_empty());
            }
            other => panic!("unexpected layout {other:?}"),
        }
    }

    #[test]
    fn fewer_than_three_has_no_remaining_section() {
        let all = fetched();
        match ListingLayout::build(&all, "roof") {
            ListingLayout::Ranked {
                featured,
                remaining,
            } => {
                assert_eq!(names(&featured), vec!["Dexter Roofing"]);
                assert!(remaining.is_empty());
            }
            other => panic!("unexpected layout {other:?}"),
        }
    }

    #[test]
    fn empty_states_are_distinguished() {
        assert_eq!(ListingLayout::build(&[], ""), ListingLayout::NoInstallers);
        assert_eq!(ListingLayout::build(&[], "solar"), ListingLayout::NoMatches);
        let all = fetched();
        assert_eq!(ListingLayout::build(&all, "geothermal"), ListingLayout::NoMatches);
    }
}
