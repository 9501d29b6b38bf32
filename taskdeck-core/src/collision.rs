//! Drop-target geometry and the nearest-corners collision heuristic.
//!
//! Pure functions over rectangles; nothing here knows about terminals or
//! widgets. Units are whatever the caller lays out in (cells, pixels).

use crate::task::{Priority, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Top-left, top-right, bottom-left, bottom-right.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.right(), self.y),
            Point::new(self.x, self.bottom()),
            Point::new(self.right(), self.bottom()),
        ]
    }

    /// Strict overlap; rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// What a region on the board means when something is dropped on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DropTarget {
    Column(Priority),
    Card(TaskId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub target: DropTarget,
    pub rect: Rect,
}

impl Region {
    pub fn column(priority: Priority, rect: Rect) -> Self {
        Self {
            target: DropTarget::Column(priority),
            rect,
        }
    }

    pub fn card(id: TaskId, rect: Rect) -> Self {
        Self {
            target: DropTarget::Card(id),
            rect,
        }
    }
}

/// Mean distance between corresponding corners of two rectangles.
pub fn corner_distance(a: &Rect, b: &Rect) -> f32 {
    a.corners()
        .iter()
        .zip(b.corners().iter())
        .map(|(p, q)| p.distance(*q))
        .sum::<f32>()
        / 4.0
}

/// Picks the region whose corners sit closest to `active`'s corners, among
/// the regions `active` overlaps. Earlier regions win ties. `None` when
/// `active` overlaps nothing.
pub fn closest_corners<'a, I>(active: &Rect, regions: I) -> Option<DropTarget>
where
    I: IntoIterator<Item = &'a Region>,
{
    let mut best: Option<(&Region, f32)> = None;
    for region in regions {
        if !active.intersects(&region.rect) {
            continue;
        }
        let d = corner_distance(active, &region.rect);
        match best {
            Some((_, bd)) if d >= bd => {}
            _ => best = Some((region, d)),
        }
    }
    best.map(|(r, _)| r.target.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Vec<Region> {
        vec![
            Region::column(Priority::High, Rect::new(0.0, 0.0, 30.0, 40.0)),
            Region::column(Priority::Medium, Rect::new(30.0, 0.0, 30.0, 40.0)),
            Region::column(Priority::Low, Rect::new(60.0, 0.0, 30.0, 40.0)),
            Region::card(TaskId::new("a"), Rect::new(1.0, 2.0, 28.0, 4.0)),
            Region::card(TaskId::new("b"), Rect::new(31.0, 2.0, 28.0, 4.0)),
        ]
    }

    #[test]
    fn card_sized_overlay_prefers_the_card_under_it() {
        let overlay = Rect::new(31.5, 2.5, 28.0, 4.0);
        assert_eq!(
            closest_corners(&overlay, &layout()),
            Some(DropTarget::Card(TaskId::new("b")))
        );
    }

    #[test]
    fn empty_area_of_a_column_resolves_to_the_column() {
        let overlay = Rect::new(62.0, 20.0, 28.0, 4.0);
        assert_eq!(
            closest_corners(&overlay, &layout()),
            Some(DropTarget::Column(Priority::Low))
        );
    }

    #[test]
    fn straddling_two_columns_picks_the_nearer() {
        // Mostly over Medium, a sliver over High.
        let overlay = Rect::new(27.0, 20.0, 28.0, 4.0);
        assert_eq!(
            closest_corners(&overlay, &layout()),
            Some(DropTarget::Column(Priority::Medium))
        );
    }

    #[test]
    fn outside_every_region_is_none() {
        let overlay = Rect::new(200.0, 200.0, 28.0, 4.0);
        assert_eq!(closest_corners(&overlay, &layout()), None);
        assert_eq!(closest_corners(&overlay, &Vec::<Region>::new()), None);
    }

    #[test]
    fn ties_keep_the_first_region() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        let regions = vec![
            Region::column(Priority::Low, r),
            Region::column(Priority::High, r),
        ];
        assert_eq!(
            closest_corners(&r, &regions),
            Some(DropTarget::Column(Priority::Low))
        );
    }

    #[test]
    fn edges_touching_is_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(a.contains(Point::new(0.0, 0.0)));
        assert!(!a.contains(Point::new(10.0, 5.0)));
    }
}
