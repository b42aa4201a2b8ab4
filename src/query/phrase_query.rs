//! Phrase matching over per-document position lists

/// Keep the positions of `next` that directly follow a valid position.
///
/// Both inputs are ascending. The result holds every `p` in `next` such that
/// `p - 1` is in `valid`, i.e. the offsets at which the phrase prefix now ends.
pub fn follow_positions(valid: &[u32], next: &[u32]) -> Vec<u32> {
    let mut out = Vec::new();
    let mut i = 0;
    for &p in next {
        if p == 0 {
            continue;
        }
        let wanted = p - 1;
        while i < valid.len() && valid[i] < wanted {
            i += 1;
        }
        if i == valid.len() {
            break;
        }
        if valid[i] == wanted {
            out.push(p);
        }
    }
    out
}

/// Progressive phrase check for one candidate document.
///
/// Feed the position list of each phrase term in order; the matcher tracks
/// the offsets at which the phrase prefix ends and reports as soon as none
/// remain.
#[derive(Debug, Default)]
pub struct PhraseMatcher {
    valid: Option<Vec<u32>>,
}

impl PhraseMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the next term's positions; returns false once the phrase is ruled out
    pub fn push(&mut self, positions: &[u32]) -> bool {
        let next = match &self.valid {
            None => positions.to_vec(),
            Some(valid) => follow_positions(valid, positions),
        };
        let alive = !next.is_empty();
        self.valid = Some(next);
        alive
    }

    /// True if at least one alignment survived every pushed term
    pub fn is_match(&self) -> bool {
        self.valid.as_ref().is_some_and(|v| !v.is_empty())
    }
}
