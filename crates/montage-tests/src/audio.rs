//! Audio graph exercised with the playback crate's fake elements.

use montage_audio::AudioGraph;
use montage_playback::testing::FakeBackend;
use montage_playback::PlayerBackend;
use std::path::Path;
use uuid::Uuid;

fn open(backend: &mut FakeBackend, path: &str) -> <FakeBackend as PlayerBackend>::Audio {
    backend.open_audio(Path::new(path)).unwrap()
}

#[test]
fn double_bind_keeps_the_first_node() {
    let mut backend = FakeBackend::new();
    let mut graph = AudioGraph::new();
    let id = Uuid::new_v4();

    assert!(graph.bind(id, open(&mut backend, "/media/a.wav"), 1.0));
    assert!(!graph.bind(id, open(&mut backend, "/media/b.wav"), 0.2));
    assert_eq!(graph.len(), 1);

    // The surviving node is the first element, still at its gain.
    graph.tick(0.0);
    let opened = backend.opened.lock();
    assert_eq!(opened[0].0.lock().gain, 1.0);
}

#[test]
fn fades_and_master_combine_on_the_element() {
    let mut backend = FakeBackend::new();
    let mut graph = AudioGraph::new();
    let id = Uuid::new_v4();
    graph.resume().unwrap();

    graph.bind(id, open(&mut backend, "/media/bed.wav"), 0.8);
    graph.set_master_volume(0.5, 0.0);
    graph.apply_fade_in(id, 0.0, 2.0, 0.0);

    graph.tick(1.0);
    let opened = backend.opened.lock();
    // 0.8 gain × 0.5 envelope × 0.5 master
    assert!((opened[0].0.lock().gain - 0.2).abs() < 1e-9);
}

#[test]
fn unbind_all_stops_every_element() {
    let mut backend = FakeBackend::new();
    let mut graph = AudioGraph::new();

    for i in 0..3 {
        let id = Uuid::new_v4();
        graph.bind(id, open(&mut backend, &format!("/media/{i}.wav")), 1.0);
        graph.play(id).unwrap();
    }
    assert!(backend.opened.lock().iter().all(|a| a.0.lock().playing));

    graph.unbind_all();
    assert!(graph.is_empty());
    assert!(backend.opened.lock().iter().all(|a| !a.0.lock().playing));
}
