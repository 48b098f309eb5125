//! Demo network generation.
//!
//! Produces a clustered random friendship network: most friendships link
//! users that sit close together in the user list, a minority link users
//! anywhere in the network. Seeded generation is fully reproducible.

use std::collections::BTreeSet;
use std::io;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Seed used when no other seed is requested.
pub const DEFAULT_DEMO_SEED: u64 = 42;

/// Parameters of the generated network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Number of users.
    pub users: usize,
    /// Minimum friendships initiated per user.
    pub min_friends: usize,
    /// Maximum friendships initiated per user.
    pub max_friends: usize,
    /// Probability that a friendship stays within the neighborhood.
    pub locality: f64,
    /// How many following users count as the neighborhood.
    pub neighborhood: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            users: 100,
            min_friends: 5,
            max_friends: 15,
            locality: 0.7,
            neighborhood: 20,
        }
    }
}

/// Name of the `index`-th demo user.
pub fn demo_user_name(index: usize) -> String {
    format!("user_{:03}", index)
}

/// Generate a deduplicated, sorted edge list.
///
/// Pairs are name-sorted within each row; self-pairs never appear.
pub fn generate_network<R: Rng>(config: &DemoConfig, rng: &mut R) -> Vec<[String; 2]> {
    if config.users < 2 {
        return Vec::new();
    }

    let names: Vec<String> = (0..config.users).map(demo_user_name).collect();
    let reach = config.neighborhood.clamp(1, config.users - 1);
    let (min_friends, max_friends) = if config.min_friends <= config.max_friends {
        (config.min_friends, config.max_friends)
    } else {
        (config.max_friends, config.min_friends)
    };
    let locality = config.locality.clamp(0.0, 1.0);

    let mut pairs: BTreeSet<(&str, &str)> = BTreeSet::new();
    for i in 0..config.users {
        let friend_count = rng.gen_range(min_friends..=max_friends);
        for _ in 0..friend_count {
            let j = if rng.gen_bool(locality) {
                (i + rng.gen_range(1..=reach)) % config.users
            } else {
                rng.gen_range(0..config.users)
            };

            if i != j {
                let (a, b) = (names[i].as_str(), names[j].as_str());
                pairs.insert(if a < b { (a, b) } else { (b, a) });
            }
        }
    }

    pairs
        .into_iter()
        .map(|(a, b)| [a.to_string(), b.to_string()])
        .collect()
}

/// Generate the default demo network from a fixed seed.
pub fn demo_rows(seed: u64) -> Vec<[String; 2]> {
    let mut rng = StdRng::seed_from_u64(seed);
    generate_network(&DemoConfig::default(), &mut rng)
}

/// Write an edge list as a `user1,user2` CSV file.
///
/// The output is what the demo endpoint reads from `SEED_CSV`.
pub fn write_demo_csv<W: io::Write>(rows: &[[String; 2]], writer: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(["user1", "user2"])?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::csv::parse_edge_csv;
    use crate::ingest::{build, IngestLimits};
    use crate::query::statistics;

    #[test]
    fn test_seeded_generation_is_reproducible() {
        assert_eq!(demo_rows(7), demo_rows(7));
        assert_ne!(demo_rows(7), demo_rows(8));
    }

    #[test]
    fn test_rows_are_canonical() {
        let rows = demo_rows(DEFAULT_DEMO_SEED);
        assert!(!rows.is_empty());

        for [a, b] in &rows {
            assert!(a < b);
        }
        assert!(rows.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_demo_csv_reloads_to_same_graph() {
        let rows = demo_rows(DEFAULT_DEMO_SEED);
        let mut out = Vec::new();
        write_demo_csv(&rows, &mut out).unwrap();

        assert!(out.starts_with(b"user1,user2\n"));

        let parsed = parse_edge_csv(&out, true).unwrap();
        let (from_csv, _) = build(parsed, &IngestLimits::default()).unwrap();
        let (direct, _) = build(&rows, &IngestLimits::default()).unwrap();
        assert_eq!(from_csv.fingerprint(), direct.fingerprint());
    }

    #[test]
    fn test_default_network_density() {
        let rows = demo_rows(DEFAULT_DEMO_SEED);
        let (graph, report) = build(&rows, &IngestLimits::default()).unwrap();

        assert_eq!(report.edges, rows.len());
        assert_eq!(report.rows_skipped, 0);

        // Each user initiates 5..=15 friendships, minus collisions
        let stats = statistics(&graph);
        assert!(stats.total_users <= 100);
        assert!(stats.average_degree >= 5.0, "average degree {}", stats.average_degree);
    }

    #[test]
    fn test_tiny_networks() {
        let mut rng = StdRng::seed_from_u64(1);
        let config = DemoConfig { users: 1, ..DemoConfig::default() };
        assert!(generate_network(&config, &mut rng).is_empty());

        let config = DemoConfig { users: 2, neighborhood: 20, ..DemoConfig::default() };
        assert_eq!(
            generate_network(&config, &mut rng),
            vec![[demo_user_name(0), demo_user_name(1)]]
        );
    }
}
