use battlesnake_api::{Match, Round, Tournament};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Geometry configuration
// ---------------------------------------------------------------------------

/// Layout constants, in abstract layout units. The terminal projection divides
/// these by a [`crate::components::bracket::CellScale`] when drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// Width of every match box.
    pub match_width: f64,
    /// Height contributed by each player row inside a box.
    pub player_height: f64,
    /// Horizontal gap between consecutive round columns.
    pub round_gap: f64,
    /// Vertical padding added below each first-round match.
    pub match_padding: f64,
    /// Box height for a match that has no players yet.
    pub empty_match_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            match_width: 300.0,
            player_height: 100.0,
            round_gap: 100.0,
            match_padding: 20.0,
            empty_match_height: 200.0,
        }
    }
}

impl LayoutConfig {
    pub fn match_height(&self, m: &Match) -> f64 {
        match m.slot_count() {
            0 => self.empty_match_height,
            n => n as f64 * self.player_height,
        }
    }

    /// Distance between the left edges of two consecutive round columns.
    pub fn column_stride(&self) -> f64 {
        self.match_width + self.round_gap
    }

    /// Sum of (height + padding) over the first round, the fixed vertical extent
    /// of the uniform layout.
    pub fn first_round_extent(&self, rounds: &[Round]) -> f64 {
        rounds
            .first()
            .map(|r| r.matches.iter().map(|m| self.match_height(m) + self.match_padding).sum())
            .unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// Render plan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MatchRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl MatchRect {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[cfg(test)]
    pub fn mid_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

/// Position of one match box.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchNode {
    pub round: usize,
    /// Ordinal within the round.
    pub index: usize,
    pub match_id: String,
    pub rect: MatchRect,
}

/// Orthogonal three-segment path from a match to the match it feeds:
/// right edge of the child → midpoint column → parent height → parent's left edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    /// `(round, index)` of the child match.
    pub from: (usize, usize),
    /// `(round, index)` of the parent slot; the slot may hold no match yet.
    pub to: (usize, usize),
    pub points: [Point; 4],
}

/// Everything needed to draw a bracket. Recomputed from scratch on every pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderPlan {
    pub width: f64,
    pub height: f64,
    /// Round-major order: all of round 0, then round 1, and so on.
    pub nodes: Vec<MatchNode>,
    pub connectors: Vec<Connector>,
}

impl RenderPlan {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[cfg(test)]
    pub fn node(&self, round: usize, index: usize) -> Option<&MatchNode> {
        self.nodes.iter().find(|n| n.round == round && n.index == index)
    }
}

// ---------------------------------------------------------------------------
// Vertical spacing strategies
// ---------------------------------------------------------------------------

/// Vertical offsets chosen by a [`SpacingStrategy`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerticalPlacement {
    pub total_height: f64,
    /// `y[round][index]` for every match in the tournament.
    pub y: Vec<Vec<f64>>,
}

pub trait SpacingStrategy {
    fn place(&self, rounds: &[Round], config: &LayoutConfig) -> VerticalPlacement;
}

/// Round 0 fixes the total height; every round splits that height into equal
/// slots, one per match, regardless of how tall its own boxes are.
///
/// Later-round boxes taller than their slot overlap the next slot. That is the
/// long-standing look of the bracket and stays the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformByFirstRound;

impl SpacingStrategy for UniformByFirstRound {
    fn place(&self, rounds: &[Round], config: &LayoutConfig) -> VerticalPlacement {
        let total_height = config.first_round_extent(rounds);
        let y = rounds
            .iter()
            .map(|round| {
                let count = round.matches.len();
                let slot = if count == 0 { 0.0 } else { total_height / count as f64 };
                (0..count).map(|i| i as f64 * slot).collect()
            })
            .collect();
        VerticalPlacement { total_height, y }
    }
}

/// Round 0 is stacked by real heights; each later match is centred on the
/// midpoint of its two feeder matches, then pushed down just enough to clear
/// the sibling above it.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecursiveMidpoint;

impl SpacingStrategy for RecursiveMidpoint {
    fn place(&self, rounds: &[Round], config: &LayoutConfig) -> VerticalPlacement {
        let mut y: Vec<Vec<f64>> = Vec::with_capacity(rounds.len());
        let mut total_height: f64 = 0.0;

        for (r, round) in rounds.iter().enumerate() {
            let mut column = Vec::with_capacity(round.matches.len());
            // Bottom edge plus padding of the previous box in this column.
            let mut floor: f64 = 0.0;

            for (i, m) in round.matches.iter().enumerate() {
                let height = config.match_height(m);
                let centred = if r == 0 {
                    None
                } else {
                    let children = &rounds[r - 1].matches;
                    let centres: Vec<f64> = [2 * i, 2 * i + 1]
                        .into_iter()
                        .filter(|&c| c < children.len())
                        .map(|c| y[r - 1][c] + config.match_height(&children[c]) / 2.0)
                        .collect();
                    if centres.is_empty() {
                        None
                    } else {
                        let centre = centres.iter().sum::<f64>() / centres.len() as f64;
                        Some(centre - height / 2.0)
                    }
                };

                let top = centred.unwrap_or(floor).max(floor);
                floor = top + height + config.match_padding;
                total_height = total_height.max(floor);
                column.push(top);
            }
            y.push(column);
        }

        VerticalPlacement { total_height, y }
    }
}

/// Named spacing strategies, selectable from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SpacingKind {
    #[default]
    Uniform,
    Midpoint,
}

impl SpacingKind {
    pub fn strategy(self) -> &'static dyn SpacingStrategy {
        match self {
            SpacingKind::Uniform => &UniformByFirstRound,
            SpacingKind::Midpoint => &RecursiveMidpoint,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SpacingKind::Uniform => "uniform",
            SpacingKind::Midpoint => "midpoint",
        }
    }
}

impl fmt::Display for SpacingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SpacingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uniform" => Ok(SpacingKind::Uniform),
            "midpoint" => Ok(SpacingKind::Midpoint),
            other => Err(format!("unknown spacing strategy {other:?} (expected uniform or midpoint)")),
        }
    }
}

// ---------------------------------------------------------------------------
// Layout engine
// ---------------------------------------------------------------------------

/// Lay out the bracket with the default uniform spacing.
pub fn compute_layout(tournament: &Tournament, config: &LayoutConfig) -> RenderPlan {
    compute_layout_with(tournament, config, &UniformByFirstRound)
}

/// Lay out the bracket. Pure: the same tournament always yields the same plan.
///
/// Match `i` of round `r` feeds slot `i / 2` of round `r + 1`. Every match
/// outside the final round gets exactly one connector. When the service has
/// not sent the parent slot yet, the connector ends where that slot would sit
/// as an empty box; it only runs straight across when the next round is empty.
pub fn compute_layout_with(
    tournament: &Tournament,
    config: &LayoutConfig,
    spacing: &dyn SpacingStrategy,
) -> RenderPlan {
    let rounds = &tournament.rounds;
    if rounds.is_empty() {
        return RenderPlan::default();
    }

    let placement = spacing.place(rounds, config);
    let stride = config.column_stride();

    let mut nodes = Vec::with_capacity(tournament.match_count());
    for (r, round) in rounds.iter().enumerate() {
        for (i, m) in round.matches.iter().enumerate() {
            nodes.push(MatchNode {
                round: r,
                index: i,
                match_id: m.id.clone(),
                rect: MatchRect {
                    x: r as f64 * stride,
                    y: placement.y[r][i],
                    width: config.match_width,
                    height: config.match_height(m),
                },
            });
        }
    }

    let mut connectors = Vec::new();
    for r in 0..rounds.len().saturating_sub(1) {
        let parents = &rounds[r + 1].matches;
        for (i, child) in rounds[r].matches.iter().enumerate() {
            let parent = i / 2;
            let start = Point::new(
                r as f64 * stride + config.match_width,
                placement.y[r][i] + config.match_height(child) / 2.0,
            );
            let end_x = (r + 1) as f64 * stride;
            let end_y = match parents.get(parent) {
                Some(p) => placement.y[r + 1][parent] + config.match_height(p) / 2.0,
                None if parents.is_empty() => start.y,
                None => {
                    let slot = placement.total_height / parents.len() as f64;
                    parent as f64 * slot + config.empty_match_height / 2.0
                }
            };
            let mid_x = start.x + (end_x - start.x) / 2.0;
            connectors.push(Connector {
                from: (r, i),
                to: (r + 1, parent),
                points: [
                    start,
                    Point::new(mid_x, start.y),
                    Point::new(mid_x, end_y),
                    Point::new(end_x, end_y),
                ],
            });
        }
    }

    RenderPlan {
        width: rounds.len() as f64 * stride,
        height: placement.total_height,
        nodes,
        connectors,
    }
}
