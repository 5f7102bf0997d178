use crate::camera::CameraView;
use crate::conn::{ConnState, ConnectionManager};
use crate::data_info::{DataInfoStore, FrameInfo};
use crate::error::ClientError;
use crate::overlay::OverlayProjector;
use crate::protocol::{ClientRequest, ServerMessage};
use crate::render_host::RenderHost;
use crate::scene::{FrameScene, SceneState};
use tracing::{debug, warn};

/// The one context object tying the client together: connection,
/// dataset info, current frame scene, and the label projector. All
/// state mutation happens in `tick`; `render_tick` only reads.
pub struct VortexClient {
    conn: ConnectionManager,
    store: DataInfoStore,
    scene: FrameScene,
    overlay: OverlayProjector,
    dbname: String,
    current_frame: usize,
}

impl VortexClient {
    pub fn new(addr: impl Into<String>, dbname: impl Into<String>) -> Self {
        Self {
            conn: ConnectionManager::new(addr),
            store: DataInfoStore::new(),
            scene: FrameScene::new(),
            overlay: OverlayProjector::new(),
            dbname: dbname.into(),
            current_frame: 0,
        }
    }

    pub fn connect(&mut self) {
        self.conn.connect();
    }

    pub fn disconnect(&mut self) {
        self.conn.disconnect();
    }

    pub fn conn_state(&self) -> ConnState {
        self.conn.state()
    }

    pub fn last_conn_error(&self) -> Option<&ClientError> {
        self.conn.last_error()
    }

    pub fn store(&self) -> &DataInfoStore {
        &self.store
    }

    pub fn scene(&self) -> &SceneState {
        self.scene.state()
    }

    pub fn dbname(&self) -> &str {
        &self.dbname
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    pub fn set_frame(&mut self, frame: usize) {
        self.current_frame = frame;
    }

    pub fn set_labels_enabled(&mut self, enabled: bool) {
        self.overlay.set_enabled(enabled);
    }

    pub fn request_data_info(&mut self) {
        debug!(dbname = %self.dbname, "requesting data info");
        self.conn.send(ClientRequest::RequestDataInfo {
            dbname: self.dbname.clone(),
        });
    }

    /// Requests the frame the client currently points at.
    pub fn request_current_frame(&mut self) {
        debug!(dbname = %self.dbname, frame = self.current_frame, "requesting frame");
        self.conn.send(ClientRequest::RequestFrame {
            dbname: self.dbname.clone(),
            frame: self.current_frame,
        });
    }

    pub fn frame_info(&self) -> Result<FrameInfo, ClientError> {
        self.store.frame_info(self.current_frame)
    }

    /// Drains socket events and applies them. Call from the host's
    /// update loop; this is the only place protocol and scene state
    /// change.
    pub fn tick(&mut self, host: &mut dyn RenderHost) {
        let frames = self.conn.poll();

        if self.conn.take_ready() {
            self.request_data_info();
            self.request_current_frame();
        }

        for text in frames {
            if let Err(e) = self.dispatch(&text, host) {
                warn!(error = %e, "dropping inbound message");
            }
        }
    }

    /// Projects labels for the current scene. Safe to call every
    /// display refresh; never mutates protocol or scene state.
    pub fn render_tick(&mut self, camera: &CameraView, host: &mut dyn RenderHost) {
        self.overlay.update(self.scene.state(), camera, host);
    }

    fn dispatch(&mut self, text: &str, host: &mut dyn RenderHost) -> Result<(), ClientError> {
        let msg: ServerMessage = serde_json::from_str(text)?;
        match msg {
            ServerMessage::DataInfo { data } => self.store.update(data),
            ServerMessage::Vlines { data } => {
                // Old labels go before any new artifact is created; the
                // projector recreates them from the new anchors on the
                // next render tick.
                self.overlay.clear(host);
                self.scene.rebuild(&data, host);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_host::RecordingHost;

    fn client() -> VortexClient {
        VortexClient::new("127.0.0.1:1", "demo.db")
    }

    #[test]
    fn malformed_text_leaves_state_untouched() {
        let mut c = client();
        let mut host = RecordingHost::new();

        let vlines = r#"{"type":"vlines","data":[
            {"gid":1,"r":9,"g":9,"b":9,"verts":[0,0,0,1,0,0]}]}"#;
        c.dispatch(vlines, &mut host).unwrap();
        assert_eq!(c.scene().len(), 1);

        let err = c.dispatch("this is not json", &mut host).unwrap_err();
        assert!(matches!(err, ClientError::Parse(_)));
        assert_eq!(c.scene().len(), 1);
        assert_eq!(host.tubes.len(), 1);
    }

    #[test]
    fn unknown_message_type_is_a_parse_error() {
        let mut c = client();
        let mut host = RecordingHost::new();
        let err = c
            .dispatch(r#"{"type":"surprise","data":[]}"#, &mut host)
            .unwrap_err();
        assert!(matches!(err, ClientError::Parse(_)));
    }

    #[test]
    fn data_info_dispatch_fills_store() {
        let mut c = client();
        let mut host = RecordingHost::new();
        let raw = r#"{"type":"dataInfo","data":{
            "cfg":{"dt":0.01},
            "hdrs":[{"timestep":5,"Bx":1.0,"By":0.0,"Bz":0.0,"V":2.0}],
            "inclusions":[]}}"#;
        c.dispatch(raw, &mut host).unwrap();

        c.set_frame(0);
        let info = c.frame_info().unwrap();
        assert!((info.t - 0.05).abs() < 1e-12);
    }

    #[test]
    fn sequential_rebuilds_replace_scene() {
        let mut c = client();
        let mut host = RecordingHost::new();

        let three = r#"{"type":"vlines","data":[
            {"gid":1,"r":0,"g":0,"b":0,"verts":[0,0,0,1,0,0]},
            {"gid":2,"r":0,"g":0,"b":0,"verts":[0,0,0,0,1,0]},
            {"gid":3,"r":0,"g":0,"b":0,"verts":[0,0,0,0,0,1]}]}"#;
        c.dispatch(three, &mut host).unwrap();
        let cam = CameraView::new(glam::Mat4::IDENTITY, 200.0, 100.0);
        c.render_tick(&cam, &mut host);
        assert_eq!(host.tubes.len(), 3);
        assert_eq!(host.labels.len(), 3);

        let one = r#"{"type":"vlines","data":[
            {"gid":7,"r":0,"g":0,"b":0,"verts":[0,0,0,1,1,1]}]}"#;
        c.dispatch(one, &mut host).unwrap();
        c.render_tick(&cam, &mut host);
        assert_eq!(host.tubes.len(), 1);
        assert_eq!(host.labels.len(), 1);
        assert!(host.labels.contains_key(&7));
    }
}
