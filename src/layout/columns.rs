//! Column detection and reading order.
//!
//! Lines are split into vertical regions by full-width ("spanning") lines.
//! Inside a region every detected column forms one band; the bands of the
//! page are then linearized with [`reading_order`], which puts side-by-side
//! bands left to right and stacked bands top to bottom.

use super::{sort_lines, Line};
use crate::clean::LayoutThresholds;
use crate::model::BBox;
use std::cmp::Ordering;

/// A vertical run of lines read as a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnBand {
    /// Position of the band in reading order
    pub index: usize,
    /// Column the band belongs to, `None` for spanning bands
    pub column: Option<usize>,
    /// Union of the line boxes
    pub bbox: BBox,
    /// Lines top-to-bottom, then left-to-right
    pub lines: Vec<Line>,
}

impl ColumnBand {
    fn new(column: Option<usize>, mut lines: Vec<Line>) -> Self {
        sort_lines(&mut lines);
        let bbox = BBox::union_all(lines.iter().map(|l| &l.bbox)).unwrap_or_default();
        Self {
            index: 0,
            column,
            bbox,
            lines,
        }
    }

    /// Whether the band is a full-width run.
    pub fn is_spanning(&self) -> bool {
        self.column.is_none()
    }
}

/// Reading-order comparator for two band boxes.
///
/// Boxes that overlap vertically by at least `side_by_side` of the smaller
/// height are side by side and ordered left to right; otherwise the upper
/// box comes first. Remaining ties fall back to top, then left.
pub fn reading_order(a: &BBox, b: &BBox, side_by_side: f32) -> Ordering {
    let min_height = a.height().min(b.height());
    let overlap = a.vertical_overlap(b);
    let by_x = a.x0.partial_cmp(&b.x0).unwrap_or(Ordering::Equal);
    let by_y = a.y0.partial_cmp(&b.y0).unwrap_or(Ordering::Equal);

    if min_height > 0.0 && overlap >= side_by_side * min_height {
        by_x.then(by_y)
    } else {
        by_y.then(by_x)
    }
}

/// Linearize bands.
///
/// The comparator is not transitive across more than two bands, so bands are
/// not sorted with it: the first remaining band (in top/left order) that no
/// other remaining band precedes is taken next. If every band is preceded by
/// another, the topmost one is taken.
pub fn order_bands(mut bands: Vec<ColumnBand>, side_by_side: f32) -> Vec<ColumnBand> {
    bands.sort_by(|a, b| {
        a.bbox
            .y0
            .partial_cmp(&b.bbox.y0)
            .unwrap_or(Ordering::Equal)
            .then(a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap_or(Ordering::Equal))
    });

    let mut ordered = Vec::with_capacity(bands.len());
    while !bands.is_empty() {
        let next = (0..bands.len())
            .find(|&i| {
                (0..bands.len()).all(|j| {
                    j == i
                        || reading_order(&bands[j].bbox, &bands[i].bbox, side_by_side)
                            != Ordering::Less
                })
            })
            .unwrap_or(0);
        ordered.push(bands.remove(next));
    }

    for (index, band) in ordered.iter_mut().enumerate() {
        band.index = index;
        for line in &mut band.lines {
            line.band = index;
        }
    }
    ordered
}

/// Groups the lines of a page into column bands.
#[derive(Debug, Clone)]
pub struct ColumnClusterer<'a> {
    thresholds: &'a LayoutThresholds,
    multicolumn: bool,
}

impl<'a> ColumnClusterer<'a> {
    /// Create a clusterer.
    pub fn new(thresholds: &'a LayoutThresholds, multicolumn: bool) -> Self {
        Self {
            thresholds,
            multicolumn,
        }
    }

    /// Cluster lines into bands in reading order.
    pub fn cluster(&self, lines: Vec<Line>) -> Vec<ColumnBand> {
        if lines.is_empty() {
            return Vec::new();
        }
        if !self.multicolumn {
            return order_bands(vec![ColumnBand::new(None, lines)], self.thresholds.side_by_side_overlap);
        }

        let grid = self.column_grid(&lines);
        if grid.starts.len() < 2 {
            log::debug!("single column layout ({} lines)", lines.len());
            return order_bands(vec![ColumnBand::new(None, lines)], self.thresholds.side_by_side_overlap);
        }
        log::debug!("{} columns at x = {:?}", grid.starts.len(), grid.starts);

        let content = content_box(&lines);
        let tolerance = 0.1 * median(lines.iter().map(|l| l.width()).collect());

        let mut lines = lines;
        sort_lines(&mut lines);

        let mut bands = Vec::new();
        let mut region: Vec<Vec<Line>> = vec![Vec::new(); grid.starts.len()];
        let mut spanning: Vec<Line> = Vec::new();

        for line in lines {
            match self.assign_column(&line, &grid, tolerance, content.width()) {
                Some(column) => {
                    if !spanning.is_empty() {
                        bands.push(ColumnBand::new(None, std::mem::take(&mut spanning)));
                    }
                    region[column].push(line);
                }
                None => {
                    flush_region(&mut region, &mut bands);
                    spanning.push(line);
                }
            }
        }
        flush_region(&mut region, &mut bands);
        if !spanning.is_empty() {
            bands.push(ColumnBand::new(None, spanning));
        }

        order_bands(bands, self.thresholds.side_by_side_overlap)
    }

    /// Cluster the left edges of narrow lines into columns.
    ///
    /// A cluster is a column when it holds at least `min_column_lines` lines
    /// or when one of its lines sits beside a line of another cluster. With
    /// no such pair and fewer than two full-size clusters the page is a
    /// single column. Clusters that do not qualify are demoted: their lines
    /// are read as spanning.
    fn column_grid(&self, lines: &[Line]) -> ColumnGrid {
        let content = content_box(lines);
        if content.width() <= 0.0 {
            return ColumnGrid::default();
        }
        let max_width = self.thresholds.spanning_width_ratio * content.width();

        let mut narrow: Vec<&Line> = lines.iter().filter(|l| l.width() <= max_width).collect();
        if narrow.len() < 2 {
            return ColumnGrid::default();
        }

        let median_width = median(narrow.iter().map(|l| l.width()).collect());
        let max_gap = self.thresholds.column_gap_ratio * median_width;

        narrow.sort_by(|a, b| a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap_or(Ordering::Equal));

        let mut clusters: Vec<Vec<&Line>> = vec![vec![narrow[0]]];
        for pair in narrow.windows(2) {
            if pair[1].bbox.x0 - pair[0].bbox.x0 > max_gap {
                clusters.push(Vec::new());
            }
            if let Some(cluster) = clusters.last_mut() {
                cluster.push(pair[1]);
            }
        }

        let paired: Vec<bool> = (0..clusters.len())
            .map(|i| (0..clusters.len()).any(|j| j != i && side_by_side(&clusters[i], &clusters[j])))
            .collect();
        let min_lines = self.thresholds.min_column_lines;
        let full_size = clusters.iter().filter(|c| c.len() >= min_lines).count();
        if full_size < 2 && !paired.contains(&true) {
            return ColumnGrid::default();
        }

        let mut grid = ColumnGrid::default();
        for (cluster, paired) in clusters.iter().zip(paired) {
            let edges: Vec<f32> = cluster.iter().map(|l| l.bbox.x0).collect();
            if paired || cluster.len() >= min_lines {
                grid.starts.push(median(edges));
            } else {
                // Edges are ascending within a cluster.
                grid.demoted.push((edges[0], edges[edges.len() - 1]));
            }
        }
        grid
    }

    /// Column of a line, or `None` when it spans columns.
    fn assign_column(&self, line: &Line, grid: &ColumnGrid, tolerance: f32, content_width: f32) -> Option<usize> {
        if line.width() > self.thresholds.spanning_width_ratio * content_width {
            return None;
        }
        let x0 = line.bbox.x0;
        if grid.demoted.iter().any(|(lo, hi)| x0 >= *lo && x0 <= *hi) {
            return None;
        }

        let column = grid
            .starts
            .iter()
            .rposition(|start| *start <= x0 + tolerance)
            .unwrap_or(0);

        match grid.starts.get(column + 1) {
            Some(next) if line.bbox.x1 > next + tolerance => None,
            _ => Some(column),
        }
    }
}

/// Detected columns of a page.
#[derive(Debug, Default)]
struct ColumnGrid {
    /// Left edges of the columns, ascending
    starts: Vec<f32>,
    /// Left-edge ranges of clusters too small to be columns
    demoted: Vec<(f32, f32)>,
}

/// Whether a line of `a` shares a row with a line of `b` across a gutter.
fn side_by_side(a: &[&Line], b: &[&Line]) -> bool {
    a.iter().any(|la| {
        b.iter()
            .any(|lb| la.bbox.vertical_overlap(&lb.bbox) > 0.0 && la.bbox.horizontal_gap(&lb.bbox) > 0.0)
    })
}

fn flush_region(region: &mut [Vec<Line>], bands: &mut Vec<ColumnBand>) {
    for (column, lines) in region.iter_mut().enumerate() {
        if !lines.is_empty() {
            bands.push(ColumnBand::new(Some(column), std::mem::take(lines)));
        }
    }
}

fn content_box(lines: &[Line]) -> BBox {
    BBox::union_all(lines.iter().map(|l| &l.bbox)).unwrap_or_default()
}

fn median(mut values: Vec<f32>) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}
