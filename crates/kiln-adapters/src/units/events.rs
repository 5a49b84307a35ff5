//! `events`: in-process publish/subscribe bus.

use kiln_core::domain::{ConfigRecord, DomainError, FileSet};

use super::BuiltinUnit;

pub const UNIT: BuiltinUnit = BuiltinUnit {
    name: "events",
    version: "1.0.0",
    description: "In-process event bus with topic subscriptions",
    dependencies: &["project"],
    enabled: |record| record.events(),
    blueprint,
};

fn blueprint(_: &ConfigRecord, files: &mut FileSet) -> Result<(), DomainError> {
    files.add("internal/events/bus.go", || BUS_GO)?;
    files.add("internal/events/bus_test.go", || BUS_TEST_GO)
}

const BUS_GO: &str = r#"// Package events is a small in-process publish/subscribe bus.
package events

import (
	"sync"
)

// Event is a named message with an arbitrary payload.
type Event struct {
	Topic   string
	Payload any
}

// Handler receives events for a topic it subscribed to.
type Handler func(Event)

// Bus delivers events synchronously to every subscriber of a topic.
type Bus struct {
	mu       sync.RWMutex
	handlers map[string][]Handler
	closed   bool
}

// NewBus returns an empty, open bus.
func NewBus() *Bus {
	return &Bus{handlers: make(map[string][]Handler)}
}

// Subscribe registers h for topic. Subscriptions after Close are ignored.
func (b *Bus) Subscribe(topic string, h Handler) {
	b.mu.Lock()
	defer b.mu.Unlock()
	if b.closed {
		return
	}
	b.handlers[topic] = append(b.handlers[topic], h)
}

// Publish calls every handler for e.Topic and returns how many ran.
func (b *Bus) Publish(e Event) int {
	b.mu.RLock()
	if b.closed {
		b.mu.RUnlock()
		return 0
	}
	hs := append([]Handler(nil), b.handlers[e.Topic]...)
	b.mu.RUnlock()

	for _, h := range hs {
		h(e)
	}
	return len(hs)
}

// Close drops all subscriptions and rejects further publishes.
func (b *Bus) Close() {
	b.mu.Lock()
	defer b.mu.Unlock()
	b.closed = true
	b.handlers = nil
}
"#;

const BUS_TEST_GO: &str = r#"package events

import (
	"testing"
)

func TestPublishReachesSubscribers(t *testing.T) {
	bus := NewBus()
	var got []string
	bus.Subscribe("user.created", func(e Event) { got = append(got, e.Payload.(string)) })

	if n := bus.Publish(Event{Topic: "user.created", Payload: "ada"}); n != 1 {
		t.Fatalf("delivered to %d handlers, want 1", n)
	}
	if len(got) != 1 || got[0] != "ada" {
		t.Fatalf("got %v", got)
	}
}

func TestClosedBusDropsEvents(t *testing.T) {
	bus := NewBus()
	bus.Subscribe("x", func(Event) { t.Fatal("handler ran after Close") })
	bus.Close()

	if n := bus.Publish(Event{Topic: "x"}); n != 0 {
		t.Fatalf("delivered to %d handlers after Close", n)
	}
}
"#;
