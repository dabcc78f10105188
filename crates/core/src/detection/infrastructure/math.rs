//! Union-find helpers used to cluster raw detections.

/// Find root of element `i` with path halving for amortized near-O(1).
pub fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Merge the sets containing `a` and `b`.
pub fn union(parent: &mut [usize], a: usize, b: usize) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        parent[ra] = rb;
    }
}

/// Splits `items` into equivalence classes of the transitive closure of
/// `same`.
///
/// Returns one label per item; labels are dense (`0..count`) and numbered
/// in order of each class's first member.
pub fn partition<T>(items: &[T], same: impl Fn(&T, &T) -> bool) -> (Vec<usize>, usize) {
    let n = items.len();
    let mut parent: Vec<usize> = (0..n).collect();
    for i in 0..n {
        for j in (i + 1)..n {
            if same(&items[i], &items[j]) {
                union(&mut parent, i, j);
            }
        }
    }

    let mut root_label = vec![usize::MAX; n];
    let mut labels = Vec::with_capacity(n);
    let mut count = 0;
    for i in 0..n {
        let root = find(&mut parent, i);
        if root_label[root] == usize::MAX {
            root_label[root] = count;
            count += 1;
        }
        labels.push(root_label[root]);
    }
    (labels, count)
}
