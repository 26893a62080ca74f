//! Algorithm R (Vitter) reservoir sampling: a fixed-size uniform random
//! sample drawn in a single streaming pass.

use rand::Rng;

#[derive(Debug, Clone)]
pub struct ReservoirSampler<T> {
    capacity: usize,
    items: Vec<T>,
    items_seen: u64,
}

impl<T: Clone> ReservoirSampler<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: Vec::with_capacity(capacity.min(1024)),
            items_seen: 0,
        }
    }

    /// Offers one item to the reservoir. Fills the reservoir first; once
    /// full, replaces a uniformly random existing slot with probability
    /// `capacity / items_seen`.
    pub fn add<R: Rng + ?Sized>(&mut self, item: T, rng: &mut R) {
        self.items_seen += 1;
        if self.items.len() < self.capacity {
            self.items.push(item);
            return;
        }
        if self.capacity == 0 {
            return;
        }
        let j = rng.gen_range(0..self.items_seen);
        if (j as usize) < self.capacity {
            self.items[j as usize] = item;
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn items_seen(&self) -> u64 {
        self.items_seen
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// `true` once `items_seen` exceeds `capacity`: the reservoir is now
    /// an estimator, not a census.
    pub fn is_saturated(&self) -> bool {
        self.items_seen > self.capacity as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn fills_up_to_capacity_then_stops_growing() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut res: ReservoirSampler<i64> = ReservoirSampler::new(5);
        for i in 0..100 {
            res.add(i, &mut rng);
        }
        assert_eq!(res.len(), 5);
        assert_eq!(res.items_seen(), 100);
    }

    #[test]
    fn len_equals_min_capacity_and_seen() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut res: ReservoirSampler<i64> = ReservoirSampler::new(10);
        for i in 0..4 {
            res.add(i, &mut rng);
        }
        assert_eq!(res.len(), 4);
        assert!(!res.is_saturated());
    }

    #[test]
    fn same_seed_gives_reproducible_contents() {
        let run = |seed: u64| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut res: ReservoirSampler<i64> = ReservoirSampler::new(3);
            for i in 0..50 {
                res.add(i, &mut rng);
            }
            res.items().to_vec()
        };
        assert_eq!(run(99), run(99));
    }
}
