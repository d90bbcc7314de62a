//! Deterministic VPA (virtual payment address) generation using
//! curated name lists.
//!
//! Handles look like real UPI addresses ("priya.sharma1284@okbank")
//! while staying fully reproducible (same RNG seed = same handles).

use crate::rng::PhaseRng;

/// VPA suffix domains seen on the major UPI apps.
pub const VPA_DOMAINS: &[&str] = &["okbank", "upi", "bank", "pay"];

/// Deterministic handle generator using curated name lists.
pub struct HandleGenerator;

impl HandleGenerator {
    /// Generate a username stem ("priya.sharma", "rgupta", "anilmehta").
    pub fn username(rng: &mut PhaseRng) -> String {
        let first = *rng.pick(Self::first_names());
        let last = *rng.pick(Self::last_names());
        match rng.next_u64_below(3) {
            0 => format!("{first}{last}"),
            1 => format!("{first}.{last}"),
            _ => format!("{}{last}", &first[..1]),
        }
    }

    /// A population VPA: username + numeric suffix + domain.
    /// The 1..=9999 suffix makes collisions rare; the population
    /// re-draws on the few that remain.
    pub fn vpa(rng: &mut PhaseRng) -> String {
        let username = Self::username(rng);
        let suffix = rng.next_u64_below(9999) + 1;
        let domain = *rng.pick(VPA_DOMAINS);
        format!("{username}{suffix}@{domain}")
    }

    /// A brand-new VPA guaranteed distinct from every population
    /// handle: the hex infix never appears in population suffixes.
    pub fn fresh_vpa(rng: &mut PhaseRng) -> String {
        let username = Self::username(rng);
        let id = rng.uuid().simple().to_string();
        let domain = *rng.pick(VPA_DOMAINS);
        format!("{username}{}@{domain}", &id[..6])
    }

    /// Curated list of common Indian first names (lowercase stems).
    fn first_names() -> &'static [&'static str] {
        &[
            "aarav", "aditi", "amit", "ananya", "anil", "anjali", "arjun", "asha",
            "deepak", "divya", "gaurav", "isha", "kavita", "kiran", "lakshmi", "manish",
            "meera", "mohan", "neha", "nikhil", "nisha", "pooja", "prakash", "priya",
            "rahul", "rajesh", "ravi", "rekha", "ritu", "rohan", "sanjay", "shreya",
            "sneha", "sunil", "suresh", "tanvi", "uma", "varun", "vijay", "vikram",
        ]
    }

    /// Curated list of common Indian last names (lowercase stems).
    fn last_names() -> &'static [&'static str] {
        &[
            "agarwal", "bhat", "chauhan", "chopra", "das", "desai", "gandhi", "gupta",
            "iyer", "jain", "joshi", "kapoor", "kaur", "khan", "kulkarni", "kumar",
            "malhotra", "mehta", "menon", "mishra", "nair", "patel", "pillai", "rao",
            "reddy", "saxena", "shah", "sharma", "singh", "sinha", "srivastava", "trivedi",
            "varma", "verma", "yadav",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::PhaseRng;

    #[test]
    fn handle_generation_is_deterministic() {
        let mut a = PhaseRng::new(12345, 0);
        let mut b = PhaseRng::new(12345, 0);
        assert_eq!(HandleGenerator::vpa(&mut a), HandleGenerator::vpa(&mut b));
    }

    #[test]
    fn vpa_has_username_and_domain() {
        let mut rng = PhaseRng::new(12345, 0);
        for _ in 0..100 {
            let vpa = HandleGenerator::vpa(&mut rng);
            let (user, domain) = vpa.split_once('@').expect("vpa has @");
            assert!(!user.is_empty());
            assert!(VPA_DOMAINS.contains(&domain), "unknown domain in {vpa}");
        }
    }

    #[test]
    fn fresh_vpa_has_hex_infix() {
        let mut rng = PhaseRng::new(12345, 0);
        for _ in 0..100 {
            let vpa = HandleGenerator::fresh_vpa(&mut rng);
            let (user, _) = vpa.split_once('@').expect("vpa has @");
            // Last six chars are lowercase hex from the uuid.
            let infix = &user[user.len() - 6..];
            assert!(infix.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }
}
