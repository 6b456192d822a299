use timbre::media::{ObjectUrlManager, UploadedFile};

fn clip() -> UploadedFile {
    UploadedFile::new("clip.wav", "audio/wav", vec![1u8, 2, 3]).unwrap()
}

#[test]
fn test_every_acquire_is_fresh() {
    let mut urls = ObjectUrlManager::new();
    let file = clip();
    let a = urls.acquire(&file);
    let b = urls.acquire(&file);

    assert_ne!(a.id(), b.id());
    assert_ne!(a.url(), b.url());
    assert!(a.url().starts_with("blob:"));
    assert_eq!(a.source(), &file);
    assert_eq!(urls.live_count(), 2);
}

#[test]
fn test_release_is_idempotent() {
    let mut urls = ObjectUrlManager::new();
    let handle = urls.acquire(&clip());

    assert!(urls.release(Some(&handle)));
    assert!(!urls.release(Some(&handle)));
    assert!(!urls.release(None));
    assert!(!urls.is_live(handle.id()));
    assert_eq!(urls.live_count(), 0);
    assert_eq!(urls.acquired_total(), 1);
    assert_eq!(urls.released_total(), 1);
}

#[test]
fn test_mixed_sequences_end_with_zero_live_after_sweep() {
    let mut urls = ObjectUrlManager::new();
    let file = clip();
    let mut kept = Vec::new();
    for i in 0..20 {
        let handle = urls.acquire(&file);
        if i % 3 == 0 {
            urls.release(Some(&handle));
            urls.release(Some(&handle));
        } else {
            kept.push(handle);
        }
    }
    for handle in kept.iter().step_by(2) {
        urls.release(Some(handle));
    }

    let leftover = urls.live_count();
    assert_eq!(urls.release_all(), leftover);
    assert_eq!(urls.live_count(), 0);
    assert_eq!(urls.acquired_total(), urls.released_total());
}
