//! Access decision engine.
//!
//! Mode is chosen before any criterion is checked: a backend whose
//! whitelist has any entry runs in whitelist mode and its blacklist is
//! ignored entirely. Otherwise the blacklist applies and the default is
//! to allow.
//!
//! Within a list the five criteria are OR-ed. An empty list never matches.
//! A browser profile only matches when all of its conjuncts hold, so a
//! profile without HTTP/2 hashes never matches anything.

use crate::fingerprint::ParsedFingerprint;
use crate::policy::store::{BackendPolicy, BrowserProfile, RuleSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Whitelist,
    Blacklist,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Whitelist => "whitelist",
            Mode::Blacklist => "blacklist",
        }
    }
}

/// The list criterion that matched a fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criterion {
    Ja3,
    Ja3n,
    Http2,
    UserAgent,
    Browser,
}

impl Criterion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::Ja3 => "ja3",
            Criterion::Ja3n => "ja3n",
            Criterion::Http2 => "http2",
            Criterion::UserAgent => "user_agent",
            Criterion::Browser => "browser",
        }
    }
}

/// Outcome of evaluating one fingerprint against one policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub decision: Decision,
    pub mode: Mode,
    /// Criterion that matched the active list, if any.
    pub matched: Option<Criterion>,
}

pub fn mode(policy: &BackendPolicy) -> Mode {
    if policy.whitelist.is_empty() {
        Mode::Blacklist
    } else {
        Mode::Whitelist
    }
}

/// Allow or deny a request.
pub fn decide(fingerprint: &ParsedFingerprint, policy: &BackendPolicy) -> Decision {
    evaluate(fingerprint, policy).decision
}

/// Like [`decide`], also reporting the mode and the matching criterion.
pub fn evaluate(fingerprint: &ParsedFingerprint, policy: &BackendPolicy) -> Verdict {
    let mode = mode(policy);

    let (matched, decision) = match mode {
        Mode::Whitelist => {
            let matched = first_match(&policy.whitelist, fingerprint);
            let decision = if matched.is_some() { Decision::Allow } else { Decision::Deny };
            (matched, decision)
        }
        Mode::Blacklist => {
            let matched = first_match(&policy.blacklist, fingerprint);
            let decision = if matched.is_some() { Decision::Deny } else { Decision::Allow };
            (matched, decision)
        }
    };

    Verdict {
        decision,
        mode,
        matched,
    }
}

/// First criterion of `rules` satisfied by the fingerprint.
pub fn first_match(rules: &RuleSet, fp: &ParsedFingerprint) -> Option<Criterion> {
    if rules.ja3_hashes.contains(&fp.ja3_hash) {
        return Some(Criterion::Ja3);
    }
    if rules.ja3n_hashes.contains(&fp.ja3n_hash) {
        return Some(Criterion::Ja3n);
    }
    if rules.http2_fingerprint_hashes.contains(&fp.http2_fingerprint_hash) {
        return Some(Criterion::Http2);
    }
    if rules.user_agents.matches(&fp.user_agent) {
        return Some(Criterion::UserAgent);
    }
    let browser = rules
        .profiles
        .iter()
        .filter_map(|r| r.profile.as_deref())
        .any(|profile| profile_matches(profile, fp));
    if browser {
        return Some(Criterion::Browser);
    }
    None
}

/// (JA3 ∈ profile OR JA3N ∈ profile) AND HTTP/2 ∈ profile AND UA matches.
pub fn profile_matches(profile: &BrowserProfile, fp: &ParsedFingerprint) -> bool {
    (profile.ja3_hashes.contains(&fp.ja3_hash) || profile.ja3n_hashes.contains(&fp.ja3n_hash))
        && profile.http2_fingerprint_hashes.contains(&fp.http2_fingerprint_hash)
        && profile.user_agents.matches(&fp.user_agent)
}
