use backline_game::{Act, ActTrait, TraitKind, Venue};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const GENRES: [(&str, &[&str]); 8] = [
    ("punk", &["hardcore", "garage", "diy"]),
    ("metal", &["doom", "thrash", "hardcore"]),
    ("jazz", &["bebop", "virtuoso", "fusion"]),
    ("folk", &["diy", "americana"]),
    ("synthwave", &["darkwave", "party"]),
    ("emo", &["midwest", "screamo"]),
    ("garage", &["psych", "surf"]),
    ("hip-hop", &["boom-bap", "party"]),
];

const ACT_TRAITS: [(&str, &str); 5] = [
    ("Straight Edge", "No drinks, no smokes, no exceptions"),
    ("Party Animals", "The after-show is the real show"),
    ("Road Veterans", "Twenty years of vans and basements"),
    ("Scene Legend", "Everyone here owns their first record"),
    ("Virtuoso Players", "Technical to a fault"),
];

const VENUE_TRAITS: [(&str, TraitKind); 10] = [
    ("GRIMY_FLOORS", TraitKind::Atmosphere),
    ("DIY_SPACE", TraitKind::Social),
    ("VINTAGE_PA", TraitKind::Technical),
    ("PRISTINE_ACOUSTICS", TraitKind::Technical),
    ("STANDING_ROOM_ONLY", TraitKind::Social),
    ("LATE_NIGHT_BAR", TraitKind::Social),
    ("ALL_AGES", TraitKind::Social),
    ("HISTORIC_STAGE", TraitKind::Legendary),
    ("NEON_LOUNGE", TraitKind::Atmosphere),
    ("OUTDOOR_YARD", TraitKind::Atmosphere),
];

/// A seeded pool of acts and venues to book from.
#[derive(Debug, Clone)]
pub struct Roster {
    pub acts: Vec<Act>,
    pub venues: Vec<Venue>,
}

impl Roster {
    pub fn generate(seed: u64, act_count: usize, venue_count: usize) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let acts = (0..act_count).map(|idx| random_act(&mut rng, idx)).collect();
        let venues = (0..venue_count)
            .map(|idx| random_venue(&mut rng, idx))
            .collect();
        Self { acts, venues }
    }

    /// Up to `size` distinct acts in random order.
    pub fn lineup<R: Rng + ?Sized>(&self, rng: &mut R, size: usize) -> Vec<Act> {
        self.acts.choose_multiple(rng, size).cloned().collect()
    }

    pub fn venue<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Venue> {
        self.venues.choose(rng)
    }
}

fn random_act<R: Rng + ?Sized>(rng: &mut R, idx: usize) -> Act {
    let (genre, subgenres) = GENRES[rng.gen_range(0..GENRES.len())];
    let sub_count = rng.gen_range(0..=subgenres.len().min(2));
    let picked: Vec<&str> = subgenres.choose_multiple(rng, sub_count).copied().collect();
    let mut act = Act::new(format!("{genre}-{idx:03}"), genre)
        .with_subgenres(picked)
        .with_stats(
            rng.gen_range(5.0..95.0),
            rng.gen_range(5.0..95.0),
            rng.gen_range(5.0..95.0),
            rng.gen_range(5.0..95.0),
        );
    if rng.gen_bool(0.6) {
        act = act.formed_in(rng.gen_range(1978..2024));
    }
    if rng.gen_bool(0.3) {
        let (name, description) = ACT_TRAITS[rng.gen_range(0..ACT_TRAITS.len())];
        act = act.with_trait(ActTrait::new(name, description));
    }
    act
}

fn random_venue<R: Rng + ?Sized>(rng: &mut R, idx: usize) -> Venue {
    let mut venue = Venue::new(format!("venue-{idx:02}"), rng.gen_range(60..800)).with_ratings(
        rng.gen_range(10.0..95.0),
        rng.gen_range(10.0..95.0),
        rng.gen_range(10.0..95.0),
    );
    let trait_count = rng.gen_range(0..=3);
    for (id, kind) in VENUE_TRAITS.choose_multiple(rng, trait_count) {
        venue = venue.with_trait(*id, *kind);
    }
    if rng.gen_bool(0.25) {
        venue = venue.with_upgrade("Better monitors", rng.gen_range(100.0..900.0));
    }
    venue
}
