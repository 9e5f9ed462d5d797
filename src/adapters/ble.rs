//! BLE link adapter.
//!
//! Implements [`LinkPort`] — the hexagonal boundary to the wireless link.
//! Connection establishment, GATT registration, subscription bookkeeping,
//! and notification delivery all live here; the domain core only sees
//! attributes, subscriptions, and events.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: Bluedroid BLE GATT server via
//!   `esp_idf_svc::sys`.
//! - **all other targets**: in-memory simulation with `sim_*` hooks for
//!   host-side tests.
//!
//! The GATT service layout is the attribute table in [`crate::attrs`]: one
//! characteristic per [`AttributeId`], each with a CCCD descriptor when it
//! supports notifications.

#[cfg(not(target_os = "espidf"))]
use heapless::Deque;
use log::info;
#[cfg(not(target_os = "espidf"))]
use log::{debug, warn};

use crate::app::ports::{LinkEvent, LinkPort};
use crate::attrs::{AttributeId, MAX_WRITE_LEN};
use crate::error::LinkError;

/// Pending peer events the adapter can hold before dropping.
const EVENT_QUEUE_CAP: usize = 16;

const ATTR_COUNT: usize = AttributeId::ALL.len();

fn attr_index(attr: AttributeId) -> usize {
    // ALL is tiny; a linear scan beats a lookup table for 11 entries.
    AttributeId::ALL
        .iter()
        .position(|a| *a == attr)
        .unwrap_or(0)
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF BLE static state
// ───────────────────────────────────────────────────────────────
//
// Bluedroid callbacks are C function pointers that cannot capture Rust
// closures. These statics bridge the callback context to the adapter.
// GATTS callbacks run in the Bluedroid task (not ISR), so a std Mutex is
// safe for the event queue.

#[cfg(target_os = "espidf")]
mod platform {
    use core::sync::atomic::{AtomicU16, AtomicU32, Ordering};

    use super::{attr_index, LinkEvent, ATTR_COUNT, EVENT_QUEUE_CAP, MAX_WRITE_LEN};
    use crate::attrs::{self, AttributeId};

    pub const NO_CONN: u32 = u32::MAX;
    /// Client Characteristic Configuration descriptor.
    const CCCD_UUID16: u16 = 0x2902;

    pub static GATTS_IF: AtomicU32 = AtomicU32::new(0);
    pub static CONN_ID: AtomicU32 = AtomicU32::new(NO_CONN);
    pub static SVC_HANDLE: AtomicU32 = AtomicU32::new(0);
    /// Index into `AttributeId::ALL` of the characteristic being registered.
    static REG_STEP: AtomicU32 = AtomicU32::new(0);

    pub static CHAR_HANDLES: [AtomicU32; ATTR_COUNT] =
        [const { AtomicU32::new(0) }; ATTR_COUNT];
    static CCCD_HANDLES: [AtomicU32; ATTR_COUNT] = [const { AtomicU32::new(0) }; ATTR_COUNT];

    /// One bit per attribute index: peer has notifications enabled.
    pub static SUBSCRIPTIONS: AtomicU16 = AtomicU16::new(0);

    pub static LINK_EVENTS: std::sync::Mutex<heapless::Deque<LinkEvent, EVENT_QUEUE_CAP>> =
        std::sync::Mutex::new(heapless::Deque::new());

    fn push_link_event(event: LinkEvent) {
        if let Ok(mut q) = LINK_EVENTS.lock() {
            if q.push_back(event).is_err() {
                log::warn!("BLE: link event queue full — event dropped");
            }
        }
    }

    fn attr_for_char_handle(handle: u32) -> Option<AttributeId> {
        CHAR_HANDLES
            .iter()
            .position(|h| h.load(Ordering::Relaxed) == handle)
            .map(|i| AttributeId::ALL[i])
    }

    fn attr_for_cccd_handle(handle: u32) -> Option<usize> {
        CCCD_HANDLES
            .iter()
            .position(|h| h.load(Ordering::Relaxed) == handle)
    }

    fn uuid128_to_esp(uuid: u128) -> esp_idf_svc::sys::esp_bt_uuid_t {
        let mut t: esp_idf_svc::sys::esp_bt_uuid_t = unsafe { core::mem::zeroed() };
        t.len = 16;
        unsafe {
            t.uuid.uuid128 = uuid.to_le_bytes();
        }
        t
    }

    /// Kick off registration of the characteristic at `step`.
    unsafe fn add_char_at(step: usize) {
        use esp_idf_svc::sys::*;
        let attr = AttributeId::ALL[step];
        let svc_handle = SVC_HANDLE.load(Ordering::Relaxed) as u16;

        let mut perm = ESP_GATT_PERM_READ;
        let mut prop = ESP_GATT_CHAR_PROP_BIT_READ;
        if attr.writable() {
            perm |= ESP_GATT_PERM_WRITE;
            prop |= ESP_GATT_CHAR_PROP_BIT_WRITE;
        }
        if attr.supports_notify() {
            prop |= ESP_GATT_CHAR_PROP_BIT_NOTIFY;
        }

        let mut char_uuid = uuid128_to_esp(attr.uuid());
        unsafe {
            esp_ble_gatts_add_char(
                svc_handle,
                &mut char_uuid,
                perm as esp_gatt_perm_t,
                prop as esp_gatt_char_prop_t,
                core::ptr::null_mut(),
                core::ptr::null_mut(),
            );
        }
    }

    pub unsafe extern "C" fn gap_event_handler(
        event: esp_idf_svc::sys::esp_gap_ble_cb_event_t,
        _param: *mut esp_idf_svc::sys::esp_ble_gap_cb_param_t,
    ) {
        use esp_idf_svc::sys::*;
        match event {
            esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_START_COMPLETE_EVT => {
                log::info!("BLE GAP: advertising started");
            }
            esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_STOP_COMPLETE_EVT => {
                log::info!("BLE GAP: advertising stopped");
            }
            _ => {}
        }
    }

    pub fn start_advertising() {
        use esp_idf_svc::sys::*;
        let mut adv_params = esp_ble_adv_params_t {
            adv_int_min: 0x20,
            adv_int_max: 0x40,
            adv_type: esp_ble_adv_type_t_ADV_TYPE_IND,
            own_addr_type: esp_ble_addr_type_t_BLE_ADDR_TYPE_PUBLIC,
            channel_map: esp_ble_adv_channel_t_ADV_CHNL_ALL,
            adv_filter_policy: esp_ble_adv_filter_t_ADV_FILTER_ALLOW_SCAN_ANY_CON_ANY,
            ..unsafe { core::mem::zeroed() }
        };
        unsafe {
            esp_ble_gap_start_advertising(&mut adv_params);
        }
    }

    pub unsafe extern "C" fn gatts_event_handler(
        event: esp_idf_svc::sys::esp_gatts_cb_event_t,
        gatts_if: esp_idf_svc::sys::esp_gatt_if_t,
        param: *mut esp_idf_svc::sys::esp_ble_gatts_cb_param_t,
    ) {
        use esp_idf_svc::sys::*;

        GATTS_IF.store(gatts_if as u32, Ordering::Relaxed);

        match event {
            esp_gatts_cb_event_t_ESP_GATTS_REG_EVT => {
                log::info!("BLE GATTS: app registered (if={})", gatts_if);
                let svc_uuid = uuid128_to_esp(attrs::compose_uuid(attrs::SERVICE_SHORT_ID));
                let mut svc_id = esp_gatt_srvc_id_t {
                    id: esp_gatt_id_t {
                        uuid: svc_uuid,
                        inst_id: 0,
                    },
                    is_primary: true,
                };
                // 1 service + (decl + value + optional CCCD) per characteristic.
                let handles = 1 + 3 * ATTR_COUNT as u16;
                unsafe {
                    esp_ble_gatts_create_service(gatts_if, &mut svc_id, handles);
                }
            }
            esp_gatts_cb_event_t_ESP_GATTS_CREATE_EVT => {
                let p = unsafe { &(*param).create };
                SVC_HANDLE.store(p.service_handle as u32, Ordering::Relaxed);
                log::info!("BLE GATTS: service created (handle={})", p.service_handle);
                unsafe {
                    esp_ble_gatts_start_service(p.service_handle);
                }
                REG_STEP.store(0, Ordering::Relaxed);
                unsafe { add_char_at(0) };
            }
            esp_gatts_cb_event_t_ESP_GATTS_ADD_CHAR_EVT => {
                let p = unsafe { &(*param).add_char };
                let step = REG_STEP.load(Ordering::Relaxed) as usize;
                let attr = AttributeId::ALL[step];
                CHAR_HANDLES[step].store(p.attr_handle as u32, Ordering::Relaxed);
                log::debug!("BLE GATTS: {:?} char (handle={})", attr, p.attr_handle);

                if attr.supports_notify() {
                    // Chain the CCCD before moving to the next characteristic.
                    let mut cccd: esp_bt_uuid_t = unsafe { core::mem::zeroed() };
                    cccd.len = 2;
                    cccd.uuid.uuid16 = CCCD_UUID16;
                    unsafe {
                        esp_ble_gatts_add_char_descr(
                            SVC_HANDLE.load(Ordering::Relaxed) as u16,
                            &mut cccd,
                            (ESP_GATT_PERM_READ | ESP_GATT_PERM_WRITE) as esp_gatt_perm_t,
                            core::ptr::null_mut(),
                            core::ptr::null_mut(),
                        );
                    }
                } else {
                    advance_registration(step);
                }
            }
            esp_gatts_cb_event_t_ESP_GATTS_ADD_CHAR_DESCR_EVT => {
                let p = unsafe { &(*param).add_char_descr };
                let step = REG_STEP.load(Ordering::Relaxed) as usize;
                CCCD_HANDLES[step].store(p.attr_handle as u32, Ordering::Relaxed);
                advance_registration(step);
            }
            esp_gatts_cb_event_t_ESP_GATTS_CONNECT_EVT => {
                let p = unsafe { &(*param).connect };
                CONN_ID.store(p.conn_id as u32, Ordering::Relaxed);
                log::info!("BLE GATTS: peer connected (conn_id={})", p.conn_id);
            }
            esp_gatts_cb_event_t_ESP_GATTS_DISCONNECT_EVT => {
                CONN_ID.store(NO_CONN, Ordering::Relaxed);
                // CCCD state is per-connection; a new peer starts unsubscribed.
                SUBSCRIPTIONS.store(0, Ordering::Relaxed);
                log::info!("BLE GATTS: peer disconnected");
                start_advertising();
            }
            esp_gatts_cb_event_t_ESP_GATTS_READ_EVT => {
                let p = unsafe { &(*param).read };
                if let Some(attr) = attr_for_char_handle(p.handle as u32) {
                    push_link_event(LinkEvent::ReadRequested(attr));
                }
            }
            esp_gatts_cb_event_t_ESP_GATTS_WRITE_EVT => {
                let p = unsafe { &(*param).write };
                let handle = p.handle as u32;
                let data = unsafe { core::slice::from_raw_parts(p.value, p.len as usize) };

                if let Some(index) = attr_for_cccd_handle(handle) {
                    let enabled = data.first().is_some_and(|b| *b != 0);
                    let bit = 1u16 << index;
                    if enabled {
                        SUBSCRIPTIONS.fetch_or(bit, Ordering::Relaxed);
                    } else {
                        SUBSCRIPTIONS.fetch_and(!bit, Ordering::Relaxed);
                    }
                    log::debug!(
                        "BLE GATTS: {:?} notifications {}",
                        AttributeId::ALL[index],
                        if enabled { "on" } else { "off" }
                    );
                } else if let Some(attr) = attr_for_char_handle(handle) {
                    let mut value = heapless::Vec::<u8, MAX_WRITE_LEN>::new();
                    if value.extend_from_slice(data).is_err() {
                        log::warn!("BLE GATTS: oversize write to {:?} dropped", attr);
                        return;
                    }
                    push_link_event(LinkEvent::Written { attr, value });
                }
            }
            _ => {}
        }
    }

    fn advance_registration(step: usize) {
        let next = step + 1;
        REG_STEP.store(next as u32, Ordering::Relaxed);
        if next < ATTR_COUNT {
            unsafe { add_char_at(next) };
        } else {
            log::info!("BLE GATTS: all {} characteristics registered", ATTR_COUNT);
        }
    }

    pub fn is_subscribed(attr: AttributeId) -> bool {
        SUBSCRIPTIONS.load(Ordering::Relaxed) & (1 << attr_index(attr)) != 0
    }

    /// Update the stored value (served on stack-handled reads) and notify
    /// the peer when subscribed. Send failures are dropped by design.
    pub fn publish(attr: AttributeId, payload: &[u8]) {
        use esp_idf_svc::sys::*;
        let handle = CHAR_HANDLES[attr_index(attr)].load(Ordering::Relaxed);
        if handle == 0 {
            return;
        }
        unsafe {
            esp_ble_gatts_set_attr_value(handle as u16, payload.len() as u16, payload.as_ptr());
        }
        let conn = CONN_ID.load(Ordering::Relaxed);
        if conn != NO_CONN && is_subscribed(attr) {
            unsafe {
                esp_ble_gatts_send_indicate(
                    GATTS_IF.load(Ordering::Relaxed) as u8,
                    conn as u16,
                    handle as u16,
                    payload.len() as u16,
                    payload.as_ptr() as *mut u8,
                    false,
                );
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Simulation state (host targets)
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
#[derive(Default)]
struct SimState {
    connected: bool,
    /// One bit per attribute index.
    subscriptions: u16,
    /// Peer actions waiting for the next `service()` pass.
    staged: Deque<LinkEvent, EVENT_QUEUE_CAP>,
    /// Events ready for `poll_event()`.
    inbox: Deque<LinkEvent, EVENT_QUEUE_CAP>,
    /// Last published payload per attribute.
    values: [heapless::Vec<u8, MAX_WRITE_LEN>; ATTR_COUNT],
}

// ───────────────────────────────────────────────────────────────
// BLE link adapter
// ───────────────────────────────────────────────────────────────

pub struct BleLink {
    device_name: heapless::String<24>,
    started: bool,
    #[cfg(not(target_os = "espidf"))]
    sim: SimState,
}

impl BleLink {
    pub fn new(device_name: heapless::String<24>) -> Self {
        Self {
            device_name,
            started: false,
            #[cfg(not(target_os = "espidf"))]
            sim: SimState::default(),
        }
    }

    /// Bring the stack up and start advertising. Failure here is fatal at
    /// boot — the node is useless without its link.
    pub fn start(&mut self) -> Result<(), LinkError> {
        self.platform_start()?;
        self.started = true;
        info!("BLE: advertising as '{}'", self.device_name);
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_start(&mut self) -> Result<(), LinkError> {
        use esp_idf_svc::sys::*;
        unsafe {
            // Release classic BT memory (BLE-only mode saves ~30 KB).
            esp_bt_controller_mem_release(esp_bt_mode_t_ESP_BT_MODE_CLASSIC_BT);

            let mut bt_cfg = esp_bt_controller_config_t::default();
            if esp_bt_controller_init(&mut bt_cfg) != ESP_OK as i32 {
                return Err(LinkError::StackInitFailed);
            }
            if esp_bt_controller_enable(esp_bt_mode_t_ESP_BT_MODE_BLE) != ESP_OK as i32 {
                return Err(LinkError::StackInitFailed);
            }
            if esp_bluedroid_init() != ESP_OK as i32 {
                return Err(LinkError::StackInitFailed);
            }
            if esp_bluedroid_enable() != ESP_OK as i32 {
                return Err(LinkError::StackInitFailed);
            }

            esp_ble_gap_register_callback(Some(platform::gap_event_handler));
            esp_ble_gatts_register_callback(Some(platform::gatts_event_handler));
            esp_ble_gatts_app_register(0);

            // The stack expects a C string; the name is capped at 24 bytes.
            let mut name_z = [0u8; 25];
            name_z[..self.device_name.len()].copy_from_slice(self.device_name.as_bytes());
            esp_ble_gap_set_device_name(name_z.as_ptr().cast());
        }
        platform::start_advertising();
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start(&mut self) -> Result<(), LinkError> {
        debug!(
            "BLE(sim): advertising '{}' ({} attributes)",
            self.device_name, ATTR_COUNT
        );
        Ok(())
    }

    // ── Simulation hooks (host-side tests & demos) ────────────

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_connected(&mut self, connected: bool) {
        self.sim.connected = connected;
        if !connected {
            // CCCD state is per-connection; a new peer starts unsubscribed.
            self.sim.subscriptions = 0;
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_subscribe(&mut self, attr: AttributeId) {
        self.sim.subscriptions |= 1 << attr_index(attr);
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_unsubscribe(&mut self, attr: AttributeId) {
        self.sim.subscriptions &= !(1 << attr_index(attr));
    }

    /// Stage a peer write; it surfaces after the next `service()` pass.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_peer_write(&mut self, attr: AttributeId, payload: &[u8]) {
        let mut value = heapless::Vec::new();
        if value.extend_from_slice(payload).is_err() {
            warn!("BLE(sim): oversize write to {attr:?} dropped");
            return;
        }
        if self.sim.staged.push_back(LinkEvent::Written { attr, value }).is_err() {
            warn!("BLE(sim): staged queue full — write dropped");
        }
    }

    /// Stage a peer read request; it surfaces after the next `service()`.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_peer_read(&mut self, attr: AttributeId) {
        if self
            .sim
            .staged
            .push_back(LinkEvent::ReadRequested(attr))
            .is_err()
        {
            warn!("BLE(sim): staged queue full — read dropped");
        }
    }

    /// Last payload published for `attr` (empty before the first publish).
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_value(&self, attr: AttributeId) -> &[u8] {
        &self.sim.values[attr_index(attr)]
    }
}

// ── LinkPort implementation ───────────────────────────────────

impl LinkPort for BleLink {
    #[cfg(target_os = "espidf")]
    fn is_connected(&self) -> bool {
        use core::sync::atomic::Ordering;
        platform::CONN_ID.load(Ordering::Relaxed) != platform::NO_CONN
    }

    #[cfg(not(target_os = "espidf"))]
    fn is_connected(&self) -> bool {
        self.sim.connected
    }

    #[cfg(target_os = "espidf")]
    fn service(&mut self) {
        // Bluedroid pumps its own task; callbacks have already queued any
        // pending peer events by the time the scheduler asks.
    }

    #[cfg(not(target_os = "espidf"))]
    fn service(&mut self) {
        while let Some(event) = self.sim.staged.pop_front() {
            if self.sim.inbox.push_back(event).is_err() {
                warn!("BLE(sim): inbox full — event dropped");
                break;
            }
        }
    }

    #[cfg(target_os = "espidf")]
    fn poll_event(&mut self) -> Option<LinkEvent> {
        platform::LINK_EVENTS.lock().ok()?.pop_front()
    }

    #[cfg(not(target_os = "espidf"))]
    fn poll_event(&mut self) -> Option<LinkEvent> {
        self.sim.inbox.pop_front()
    }

    #[cfg(target_os = "espidf")]
    fn is_subscribed(&self, attr: AttributeId) -> bool {
        platform::is_subscribed(attr)
    }

    #[cfg(not(target_os = "espidf"))]
    fn is_subscribed(&self, attr: AttributeId) -> bool {
        self.sim.subscriptions & (1 << attr_index(attr)) != 0
    }

    #[cfg(target_os = "espidf")]
    fn publish(&mut self, attr: AttributeId, payload: &[u8]) {
        platform::publish(attr, payload);
    }

    #[cfg(not(target_os = "espidf"))]
    fn publish(&mut self, attr: AttributeId, payload: &[u8]) {
        debug!("BLE(sim): publish {attr:?} ({} bytes)", payload.len());
        let slot = &mut self.sim.values[attr_index(attr)];
        slot.clear();
        if slot.extend_from_slice(payload).is_err() {
            warn!("BLE(sim): oversize publish to {attr:?} truncated");
        }
    }
}
