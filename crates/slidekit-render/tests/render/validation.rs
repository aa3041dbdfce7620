use async_trait::async_trait;
use slidekit_render::{
    next_check, DebouncedValidator, ImageLoader, MemoryImageLoader, Result, UrlCheck,
    ValidationState,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Records every source it is asked for.
struct CountingLoader {
    inner: MemoryImageLoader,
    requests: Mutex<Vec<String>>,
}

#[async_trait]
impl ImageLoader for CountingLoader {
    async fn fetch(&self, source: &str) -> Result<Vec<u8>> {
        self.requests.lock().expect("lock").push(source.to_string());
        self.inner.fetch(source).await
    }
}

#[tokio::test(start_paused = true)]
async fn test_only_latest_input_is_probed() {
    let loader = Arc::new(CountingLoader {
        inner: MemoryImageLoader::new().with_image("c.png", super::png(3, 2, [1, 2, 3, 255])),
        requests: Mutex::new(Vec::new()),
    });
    let mut validator = DebouncedValidator::new(loader.clone(), Duration::from_millis(500));
    let mut rx = validator.subscribe();

    validator.submit("a.png");
    tokio::time::advance(Duration::from_millis(100)).await;
    validator.submit("b.png");
    tokio::time::advance(Duration::from_millis(100)).await;
    validator.submit("c.png");
    assert_eq!(validator.generation(), 3);

    let (url, check) = next_check(&mut rx).await.expect("check");
    assert_eq!(url, "c.png");
    assert_eq!(check, UrlCheck::Valid { width: 3, height: 2 });
    assert_eq!(loader.requests.lock().expect("lock").as_slice(), ["c.png".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_discards_pending_check() {
    let loader = Arc::new(MemoryImageLoader::new());
    let mut validator = DebouncedValidator::new(loader, Duration::from_millis(500));
    validator.submit("x.png");
    validator.cancel();
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(validator.state(), ValidationState::Idle);
}
