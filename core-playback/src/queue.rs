//! Playback queue and play-order permutation.
//!
//! The queue owns an ordered song list, the current position, and the
//! derived play order: the identity permutation in sequential mode, a
//! pseudo-random permutation in shuffle mode. The play order always
//! contains each queue index exactly once; next/previous traverse it
//! cyclically, so the currently playing index is the first element of the
//! traversal that starts at its own slot.

use core_catalog::Song;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

/// Ordered queue of songs plus current position and play order.
#[derive(Debug, Clone)]
pub struct PlaybackQueue {
    songs: Vec<Song>,
    current_index: Option<usize>,
    shuffle_enabled: bool,
    play_order: Vec<usize>,
}

impl PlaybackQueue {
    /// An empty queue in sequential mode.
    pub fn new() -> Self {
        Self {
            songs: Vec::new(),
            current_index: None,
            shuffle_enabled: false,
            play_order: Vec::new(),
        }
    }

    /// Replace the queue wholesale.
    ///
    /// `start_index` is clamped into range; an empty `songs` list empties
    /// the queue. The shuffle flag survives the replacement and the play
    /// order is rebuilt for the new length. Returns the effective current
    /// index.
    pub fn load(&mut self, songs: Vec<Song>, start_index: usize, rng: &mut SmallRng) -> Option<usize> {
        self.songs = songs;
        if self.songs.is_empty() {
            self.current_index = None;
            self.play_order.clear();
            return None;
        }

        let index = start_index.min(self.songs.len() - 1);
        self.current_index = Some(index);
        self.rebuild_play_order(rng);
        Some(index)
    }

    /// Toggle shuffle mode, rebuilding the play order.
    ///
    /// Enabling keeps the current index's slot fixed while permuting every
    /// other entry, so the traversal that begins at the current song neither
    /// skips nor repeats it. Disabling restores index-ascending order; the
    /// current index itself is untouched either way.
    pub fn set_shuffle(&mut self, enabled: bool, rng: &mut SmallRng) {
        self.shuffle_enabled = enabled;
        self.rebuild_play_order(rng);
    }

    fn rebuild_play_order(&mut self, rng: &mut SmallRng) {
        let len = self.songs.len();
        self.play_order = (0..len).collect();
        if !self.shuffle_enabled || len < 2 {
            return;
        }

        match self.current_index {
            Some(current) => {
                // Permute everything except the current index's slot.
                let mut rest: Vec<usize> = (0..len).filter(|&i| i != current).collect();
                rest.shuffle(rng);
                let mut order = Vec::with_capacity(len);
                let mut rest_iter = rest.into_iter();
                for position in 0..len {
                    if position == current {
                        order.push(current);
                    } else {
                        // rest has exactly len-1 entries, one per slot
                        order.push(rest_iter.next().unwrap_or(position));
                    }
                }
                self.play_order = order;
            }
            None => self.play_order.shuffle(rng),
        }
    }

    /// Move the current position one step forward through the play order,
    /// wrapping at the end. Returns the new current index.
    pub fn advance(&mut self) -> Option<usize> {
        let next = self.neighbor(1)?;
        self.current_index = Some(next);
        Some(next)
    }

    /// Move the current position one step backward through the play order,
    /// wrapping at the start. Returns the new current index.
    pub fn retreat(&mut self) -> Option<usize> {
        let previous = self.neighbor(-1)?;
        self.current_index = Some(previous);
        Some(previous)
    }

    fn neighbor(&self, offset: isize) -> Option<usize> {
        let current = self.current_index?;
        let len = self.play_order.len();
        if len == 0 {
            return None;
        }
        let position = self.play_order.iter().position(|&index| index == current)?;
        let stepped = (position as isize + offset).rem_euclid(len as isize) as usize;
        self.play_order.get(stepped).copied()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current_song(&self) -> Option<&Song> {
        self.songs.get(self.current_index?)
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn play_order(&self) -> &[usize] {
        &self.play_order
    }

    pub fn shuffle_enabled(&self) -> bool {
        self.shuffle_enabled
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}

impl Default for PlaybackQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_catalog::{ArtistId, ArtistRef, SongId};
    use rand::SeedableRng;

    fn song(id: usize) -> Song {
        Song {
            id: SongId::new(format!("song-{}", id)),
            title: format!("Song {}", id),
            artist: ArtistRef {
                id: ArtistId::new("artist-1"),
                name: "The Band".to_string(),
            },
            image_url: format!("https://cdn.test/covers/{}.jpg", id),
            audio_url: format!("https://cdn.test/audio/{}.mp3", id),
            duration_secs: 200,
            album_id: None,
        }
    }

    fn songs(n: usize) -> Vec<Song> {
        (0..n).map(song).collect()
    }

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(7)
    }

    #[test]
    fn test_load_clamps_start_index() {
        let mut queue = PlaybackQueue::new();
        let mut rng = rng();

        assert_eq!(queue.load(songs(3), 99, &mut rng), Some(2));
        assert_eq!(queue.current_index(), Some(2));

        assert_eq!(queue.load(songs(3), 1, &mut rng), Some(1));
        assert_eq!(queue.current_song().unwrap().id, SongId::new("song-1"));
    }

    #[test]
    fn test_load_empty_empties_queue() {
        let mut queue = PlaybackQueue::new();
        let mut rng = rng();

        queue.load(songs(3), 0, &mut rng);
        assert_eq!(queue.load(Vec::new(), 0, &mut rng), None);
        assert!(queue.is_empty());
        assert_eq!(queue.current_index(), None);
        assert!(queue.play_order().is_empty());
    }

    #[test]
    fn test_advance_wraps_around() {
        let mut queue = PlaybackQueue::new();
        let mut rng = rng();
        queue.load(songs(3), 0, &mut rng);

        assert_eq!(queue.advance(), Some(1));
        assert_eq!(queue.advance(), Some(2));
        assert_eq!(queue.advance(), Some(0));
    }

    #[test]
    fn test_retreat_wraps_to_last() {
        let mut queue = PlaybackQueue::new();
        let mut rng = rng();
        queue.load(songs(3), 0, &mut rng);

        assert_eq!(queue.retreat(), Some(2));
        assert_eq!(queue.retreat(), Some(1));
    }

    #[test]
    fn test_single_song_wraps_to_itself() {
        let mut queue = PlaybackQueue::new();
        let mut rng = rng();
        queue.load(songs(1), 0, &mut rng);

        assert_eq!(queue.advance(), Some(0));
        assert_eq!(queue.retreat(), Some(0));
    }

    #[test]
    fn test_empty_queue_navigation_is_noop() {
        let mut queue = PlaybackQueue::new();
        assert_eq!(queue.advance(), None);
        assert_eq!(queue.retreat(), None);
    }

    #[test]
    fn test_shuffle_is_valid_permutation_with_current_slot_fixed() {
        let mut queue = PlaybackQueue::new();
        let mut rng = rng();
        queue.load(songs(10), 4, &mut rng);

        queue.set_shuffle(true, &mut rng);

        let mut sorted = queue.play_order().to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..10).collect::<Vec<_>>());

        // The current index's slot is untouched and the current song stays.
        assert_eq!(queue.play_order()[4], 4);
        assert_eq!(queue.current_index(), Some(4));
    }

    #[test]
    fn test_shuffle_off_restores_ascending_order() {
        let mut queue = PlaybackQueue::new();
        let mut rng = rng();
        queue.load(songs(10), 4, &mut rng);

        queue.set_shuffle(true, &mut rng);
        queue.advance();
        let current = queue.current_index();

        queue.set_shuffle(false, &mut rng);
        assert_eq!(queue.play_order(), (0..10).collect::<Vec<_>>().as_slice());
        assert_eq!(queue.current_index(), current);
    }

    #[test]
    fn test_shuffle_traversal_visits_each_song_once() {
        let mut queue = PlaybackQueue::new();
        let mut rng = rng();
        queue.load(songs(8), 3, &mut rng);
        queue.set_shuffle(true, &mut rng);

        let mut visited = vec![queue.current_index().unwrap()];
        for _ in 0..7 {
            visited.push(queue.advance().unwrap());
        }

        let mut sorted = visited.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 8);

        // One more step wraps back to where the traversal started.
        assert_eq!(queue.advance(), Some(visited[0]));
    }

    #[test]
    fn test_shuffle_survives_reload() {
        let mut queue = PlaybackQueue::new();
        let mut rng = rng();
        queue.set_shuffle(true, &mut rng);

        queue.load(songs(5), 0, &mut rng);
        assert!(queue.shuffle_enabled());

        let mut sorted = queue.play_order().to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..5).collect::<Vec<_>>());
    }
}
