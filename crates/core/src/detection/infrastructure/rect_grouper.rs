use crate::shared::detection_box::DetectionBox;

use super::math;

/// Merges overlapping raw cascade hits into final detections.
///
/// Hits are clustered by [`DetectionBox::is_similar`]; every cluster with
/// more than `min_neighbors` members becomes one averaged box. A surviving
/// box nested inside a stronger cluster's box is dropped as well. With
/// `min_neighbors == 0` the raw hits are returned unchanged.
pub fn group_rectangles(
    boxes: &[DetectionBox],
    min_neighbors: u32,
    eps: f64,
) -> Vec<DetectionBox> {
    if min_neighbors == 0 || boxes.is_empty() {
        return boxes.to_vec();
    }

    let (labels, class_count) = math::partition(boxes, |a, b| a.is_similar(b, eps));

    let mut sums = vec![[0i64; 4]; class_count];
    let mut weights = vec![0u32; class_count];
    for (b, &label) in boxes.iter().zip(&labels) {
        let s = &mut sums[label];
        s[0] += b.x as i64;
        s[1] += b.y as i64;
        s[2] += b.width as i64;
        s[3] += b.height as i64;
        weights[label] += 1;
    }

    let averaged: Vec<DetectionBox> = sums
        .iter()
        .zip(&weights)
        .map(|(s, &n)| {
            let avg = |v: i64| (v as f64 / n as f64).round() as i32;
            DetectionBox::new(avg(s[0]), avg(s[1]), avg(s[2]), avg(s[3]))
        })
        .collect();

    let mut grouped = Vec::new();
    for (i, r1) in averaged.iter().enumerate() {
        let n1 = weights[i];
        if n1 <= min_neighbors {
            continue;
        }
        let swallowed = averaged.iter().enumerate().any(|(j, r2)| {
            let n2 = weights[j];
            j != i
                && n2 > min_neighbors
                && r1.is_inside(r2, eps)
                && (n2 > n1.max(3) || n1 < 3)
        });
        if !swallowed {
            grouped.push(*r1);
        }
    }
    grouped
}
