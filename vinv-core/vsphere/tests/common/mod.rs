//! 进程内 vCenter 模拟服务
//!
//! 只实现客户端用到的 VI/JSON 与 REST 子集，清单数据完全由测试构造。

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use serde_json::{json, Value};

use vinv_vsphere::{ClientConfig, Endpoint, VsphereClient};

pub const USERNAME: &str = "administrator@vsphere.local";
pub const PASSWORD: &str = "VMware1!";
pub const ROOT_FOLDER: &str = "group-d1";

const SESSION_HEADER: &str = "vmware-api-session-id";

/// 模拟清单中的一个对象
#[derive(Debug, Clone)]
pub struct MockObject {
    pub kind: String,
    pub id: String,
    /// 所属数据中心 ID
    pub datacenter: Option<String>,
    pub props: BTreeMap<String, Value>,
}

impl MockObject {
    pub fn new(kind: &str, id: &str, datacenter: Option<&str>) -> Self {
        Self {
            kind: kind.to_string(),
            id: id.to_string(),
            datacenter: datacenter.map(str::to_string),
            props: BTreeMap::new(),
        }
    }

    pub fn prop(mut self, path: &str, value: Value) -> Self {
        self.props.insert(path.to_string(), value);
        self
    }

    pub fn named(self, name: &str) -> Self {
        self.prop("name", json!({"_typeName": "string", "_value": name}))
    }
}

/// 模拟清单
#[derive(Debug, Clone, Default)]
pub struct MockInventory {
    pub objects: Vec<MockObject>,
    pub tags: Vec<Value>,
    pub categories: Vec<Value>,
    /// (标签 ID, 对象类型, 对象 ID)
    pub attachments: Vec<(String, String, String)>,
    /// (数据存储 ID, VStorageObject)
    pub disks: Vec<(String, Value)>,
    pub vstorage: bool,
    /// 列出磁盘时返回故障的数据存储 ID
    pub faulty_datastores: Vec<String>,
}

pub fn moref(kind: &str, id: &str) -> Value {
    json!({"_typeName": "ManagedObjectReference", "type": kind, "value": id})
}

impl MockInventory {
    /// 只含数据中心的清单
    pub fn with_datacenters(names: &[&str]) -> Self {
        let objects = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                MockObject::new("Datacenter", &format!("datacenter-{}", i + 3), None).named(name)
            })
            .collect();
        Self {
            objects,
            ..Default::default()
        }
    }

    /// 一个数据中心下的完整实验室清单
    pub fn lab() -> Self {
        let dc = Some("datacenter-3");
        let mut inv = Self::with_datacenters(&["DC0"]);
        inv.vstorage = true;

        inv.objects.push(MockObject::new("ClusterComputeResource", "domain-c8", dc).named("Cluster01"));

        inv.objects.push(
            MockObject::new("HostSystem", "host-10", dc)
                .named("esx-01.lab")
                .prop("summary", host_summary("host-10", "esx-01.lab", "Dell Inc.", "PowerEdge R640", 2100, 16, 4200, 137438953472, 65536))
                .prop("hardware.systemInfo", json!({"_typeName": "HostSystemInfo", "vendor": "Dell Inc.", "model": "PowerEdge R640", "uuid": "4c4c4544-0010"}))
                .prop("hardware.pciDevice", json!({"_typeName": "ArrayOfHostPciDevice", "_value": [
                    {"_typeName": "HostPciDevice", "id": "0000:00:00.0"},
                    {"_typeName": "HostPciDevice", "id": "0000:3b:00.0"},
                    {"_typeName": "HostPciDevice", "id": "0000:d8:00.0"}
                ]})),
        );
        inv.objects.push(
            MockObject::new("HostSystem", "host-11", dc)
                .named("esx-02.lab")
                .prop("summary", host_summary("host-11", "esx-02.lab", "HPE", "ProLiant DL380 Gen10", 2400, 20, 1200, 274877906944, 32768))
                .prop("hardware.systemInfo", json!({"_typeName": "HostSystemInfo", "vendor": "HPE", "model": "ProLiant DL380 Gen10", "uuid": "30393137-3136"})),
        );

        inv.objects.push(
            MockObject::new("Datastore", "datastore-15", dc)
                .named("vsanDatastore")
                .prop("summary", json!({
                    "_typeName": "DatastoreSummary",
                    "datastore": moref("Datastore", "datastore-15"),
                    "name": "vsanDatastore",
                    "url": "ds:///vmfs/volumes/vsan:52a1/",
                    "capacity": 4398046511104i64,
                    "freeSpace": 1099511627776i64,
                    "accessible": true,
                    "type": "vsan"
                })),
        );
        inv.objects.push(
            MockObject::new("Datastore", "datastore-16", dc)
                .named("nfs-iso")
                .prop("summary", json!({
                    "_typeName": "DatastoreSummary",
                    "datastore": moref("Datastore", "datastore-16"),
                    "name": "nfs-iso",
                    "capacity": 536870912000i64,
                    "freeSpace": 268435456000i64,
                    "accessible": true,
                    "type": "NFS"
                })),
        );

        inv.objects.push(MockObject::new("Network", "network-20", dc).named("VM Network"));

        inv.objects.push(
            MockObject::new("VmwareDistributedVirtualSwitch", "dvs-21", dc)
                .named("DSwitch")
                .prop("configStatus", json!({"_typeName": "ManagedEntityStatus", "_value": "green"}))
                .prop("overallStatus", json!({"_typeName": "ManagedEntityStatus", "_value": "green"}))
                .prop("config", json!({
                    "_typeName": "VMwareDVSConfigInfo",
                    "name": "DSwitch",
                    "configVersion": "3",
                    "switchIpAddress": "10.27.51.1",
                    "numPorts": 24,
                    "defaultPortConfig": {
                        "_typeName": "VMwareDVSPortSetting",
                        "vlan": {"_typeName": "VmwareDistributedVirtualSwitchVlanIdSpec", "inherited": false, "vlanId": 0}
                    }
                })),
        );
        inv.objects.push(
            MockObject::new("DistributedVirtualPortgroup", "dvportgroup-22", dc)
                .named("DSwitch-DVUplinks-21")
                .prop("config", json!({
                    "_typeName": "DVPortgroupConfigInfo",
                    "name": "DSwitch-DVUplinks-21",
                    "numPorts": 8,
                    "type": "earlyBinding",
                    "defaultPortConfig": {
                        "_typeName": "VMwareDVSPortSetting",
                        "vlan": {
                            "_typeName": "VmwareDistributedVirtualSwitchTrunkVlanSpec",
                            "inherited": false,
                            "vlanId": [{"_typeName": "NumericRange", "start": 0, "end": 4094}]
                        }
                    }
                })),
        );
        inv.objects.push(
            MockObject::new("DistributedVirtualPortgroup", "dvportgroup-23", dc)
                .named("pg-vlan100")
                .prop("config", json!({
                    "_typeName": "DVPortgroupConfigInfo",
                    "name": "pg-vlan100",
                    "numPorts": 16,
                    "type": "earlyBinding",
                    "defaultPortConfig": {
                        "_typeName": "VMwareDVSPortSetting",
                        "vlan": {"_typeName": "VmwareDistributedVirtualSwitchVlanIdSpec", "inherited": false, "vlanId": 100}
                    }
                })),
        );

        inv.objects.push(vm("vm-42", "k8s-master-01", "host-10", "poweredOn", Some("10.0.0.11")));
        inv.objects.push(vm("vm-43", "k8s-worker-01", "host-11", "poweredOn", Some("10.0.0.21")));
        inv.objects.push(vm("vm-44", "win-jump", "host-10", "poweredOff", None));

        inv.categories.push(json!({
            "id": "urn:vmomi:InventoryServiceCategory:c1:GLOBAL",
            "name": "k8s-role",
            "description": "",
            "cardinality": "SINGLE",
            "associable_types": ["VirtualMachine"]
        }));
        for (id, name) in [
            ("urn:vmomi:InventoryServiceTag:t1:GLOBAL", "master"),
            ("urn:vmomi:InventoryServiceTag:t2:GLOBAL", "worker"),
        ] {
            inv.tags.push(json!({
                "id": id,
                "name": name,
                "description": "",
                "category_id": "urn:vmomi:InventoryServiceCategory:c1:GLOBAL",
                "used_by": []
            }));
        }
        inv.attachments.push((
            "urn:vmomi:InventoryServiceTag:t1:GLOBAL".to_string(),
            "VirtualMachine".to_string(),
            "vm-42".to_string(),
        ));
        inv.attachments.push((
            "urn:vmomi:InventoryServiceTag:t2:GLOBAL".to_string(),
            "VirtualMachine".to_string(),
            "vm-43".to_string(),
        ));

        for (id, name, size) in [
            ("6d9c1a6e-0001", "pvc-data-01", 10240),
            ("6d9c1a6e-0002", "pvc-data-02", 20480),
        ] {
            inv.disks.push(("datastore-15".to_string(), fcd(id, name, size)));
        }

        inv
    }

    fn find(&self, kind: &str, id: &str) -> Option<&MockObject> {
        self.objects.iter().find(|o| o.kind == kind && o.id == id)
    }
}

#[allow(clippy::too_many_arguments)]
fn host_summary(
    id: &str,
    name: &str,
    vendor: &str,
    model: &str,
    cpu_mhz: i64,
    cores: i64,
    cpu_usage: i64,
    memory: i64,
    memory_usage: i64,
) -> Value {
    json!({
        "_typeName": "HostListSummary",
        "host": moref("HostSystem", id),
        "hardware": {
            "_typeName": "HostHardwareSummary",
            "vendor": vendor,
            "model": model,
            "memorySize": memory,
            "cpuMhz": cpu_mhz,
            "numCpuCores": cores
        },
        "config": {"_typeName": "HostConfigSummary", "name": name},
        "quickStats": {"_typeName": "HostListSummaryQuickStats", "overallCpuUsage": cpu_usage, "overallMemoryUsage": memory_usage},
        "overallStatus": "green"
    })
}

fn vm(id: &str, name: &str, host: &str, power: &str, ip: Option<&str>) -> MockObject {
    MockObject::new("VirtualMachine", id, Some("datacenter-3"))
        .named(name)
        .prop("summary", json!({
            "_typeName": "VirtualMachineSummary",
            "vm": moref("VirtualMachine", id),
            "config": {
                "_typeName": "VirtualMachineConfigSummary",
                "name": name,
                "template": false,
                "vmPathName": format!("[vsanDatastore] {}/{}.vmx", name, name),
                "memorySizeMB": 8192,
                "cpuReservation": 0,
                "memoryReservation": 0,
                "numCpu": 4,
                "guestId": "ubuntu64Guest",
                "guestFullName": "Ubuntu Linux (64-bit)"
            },
            "runtime": {
                "_typeName": "VirtualMachineRuntimeInfo",
                "host": moref("HostSystem", host),
                "powerState": power
            },
            "guest": {
                "_typeName": "VirtualMachineGuestSummary",
                "hwVersion": "vmx-19",
                "ipAddress": ip
            }
        }))
}

fn fcd(id: &str, name: &str, capacity_mb: i64) -> Value {
    json!({
        "_typeName": "VStorageObject",
        "config": {
            "_typeName": "VStorageObjectConfigInfo",
            "id": {"_typeName": "ID", "id": id},
            "name": name,
            "createTime": "2023-03-01T10:00:00.123Z",
            "capacityInMB": capacity_mb,
            "consumptionType": ["disk"],
            "backing": {
                "_typeName": "BaseConfigInfoDiskFileBackingInfo",
                "datastore": moref("Datastore", "datastore-15"),
                "filePath": format!("[vsanDatastore] fcd/{}.vmdk", name),
                "backingObjectId": format!("52a1-{}", id),
                "deltaSizeInMB": 0,
                "provisioningType": "thin"
            }
        }
    })
}

/// 模拟服务状态
#[derive(Default)]
pub struct MockState {
    pub inventory: MockInventory,
    sessions: Mutex<HashSet<String>>,
    rest_sessions: Mutex<HashSet<String>>,
    views: Mutex<HashMap<String, Vec<Value>>>,
    pages: Mutex<HashMap<String, VecDeque<Vec<Value>>>>,
    counter: AtomicUsize,
    pub logins: AtomicUsize,
    pub rest_logins: AtomicUsize,
    pub retrieve_calls: AtomicUsize,
    pub continue_calls: AtomicUsize,
    pub views_created: AtomicUsize,
    pub views_destroyed: AtomicUsize,
}

impl MockState {
    fn next_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    pub fn active_rest_sessions(&self) -> usize {
        self.rest_sessions.lock().unwrap().len()
    }

    pub fn open_views(&self) -> usize {
        self.views.lock().unwrap().len()
    }
}

/// 运行中的模拟 vCenter
pub struct MockVcenter {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
}

impl MockVcenter {
    pub async fn start(inventory: MockInventory) -> Self {
        let state = Arc::new(MockState {
            inventory,
            ..Default::default()
        });

        let app = Router::new()
            .route(
                "/sdk/vim25/:release/:mo_type/:mo_id/:member",
                get(vim_get).post(vim_post),
            )
            .route("/api/session", post(rest_login).delete(rest_logout))
            .route("/api/cis/tagging/tag", get(list_tags))
            .route("/api/cis/tagging/tag/:id", get(get_tag))
            .route("/api/cis/tagging/category/:id", get(get_category))
            .route("/api/cis/tagging/tag-association", post(tag_association))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}/sdk", self.addr)
    }

    pub fn client(&self) -> VsphereClient {
        self.client_with(ClientConfig::default())
    }

    pub fn client_with(&self, config: ClientConfig) -> VsphereClient {
        VsphereClient::new(Endpoint::parse(&self.url()).unwrap(), config).unwrap()
    }

    /// 已登录的客户端
    pub async fn logged_in(&self) -> VsphereClient {
        let client = self.client();
        client.login(USERNAME, PASSWORD).await.unwrap();
        client
    }
}

fn fault(type_name: &str, extra: Value) -> Response {
    let mut body = json!({"_typeName": type_name, "faultMessage": []});
    if let (Some(target), Value::Object(fields)) = (body.as_object_mut(), extra) {
        target.extend(fields);
    }
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

fn not_found(obj: &Value) -> Response {
    fault("ManagedObjectNotFound", json!({"obj": obj}))
}

fn has_session(state: &MockState, headers: &HeaderMap) -> bool {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |token| state.sessions.lock().unwrap().contains(token))
}

fn service_content(state: &MockState) -> Value {
    let mut content = json!({
        "_typeName": "ServiceContent",
        "rootFolder": moref("Folder", ROOT_FOLDER),
        "propertyCollector": moref("PropertyCollector", "propertyCollector"),
        "viewManager": moref("ViewManager", "ViewManager"),
        "sessionManager": moref("SessionManager", "SessionManager"),
        "about": {
            "_typeName": "AboutInfo",
            "name": "VMware vCenter Server",
            "fullName": "VMware vCenter Server 8.0.1 build-21560480",
            "vendor": "VMware, Inc.",
            "version": "8.0.1",
            "build": "21560480",
            "apiType": "VirtualCenter",
            "apiVersion": "8.0.1.0",
            "instanceUuid": "b5b8f6e0-mock"
        }
    });
    if state.inventory.vstorage {
        content["vStorageObjectManager"] =
            moref("VcenterVStorageObjectManager", "VStorageObjectManager");
    }
    content
}

async fn vim_get(
    State(state): State<Arc<MockState>>,
    Path((_release, mo_type, mo_id, member)): Path<(String, String, String, String)>,
    headers: HeaderMap,
) -> Response {
    if mo_type == "ServiceInstance" && member == "content" {
        return Json(service_content(&state)).into_response();
    }
    if !has_session(&state, &headers) {
        return fault("NotAuthenticated", json!({}));
    }
    match (mo_type.as_str(), member.as_str()) {
        ("ContainerView", "view") => match state.views.lock().unwrap().get(&mo_id) {
            Some(refs) => Json(Value::Array(refs.clone())).into_response(),
            None => not_found(&moref("ContainerView", &mo_id)),
        },
        _ => fault("InvalidProperty", json!({"name": member})),
    }
}

async fn vim_post(
    State(state): State<Arc<MockState>>,
    Path((_release, mo_type, mo_id, member)): Path<(String, String, String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    if mo_type == "SessionManager" && member == "Login" {
        return login(&state, &body);
    }
    if !has_session(&state, &headers) {
        return fault("NotAuthenticated", json!({}));
    }

    match (mo_type.as_str(), member.as_str()) {
        ("SessionManager", "Logout") => {
            if let Some(token) = headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok()) {
                state.sessions.lock().unwrap().remove(token);
            }
            StatusCode::NO_CONTENT.into_response()
        }
        ("ViewManager", "CreateContainerView") => create_container_view(&state, &body),
        ("ContainerView", "DestroyView") => {
            state.views_destroyed.fetch_add(1, Ordering::SeqCst);
            match state.views.lock().unwrap().remove(&mo_id) {
                Some(_) => StatusCode::NO_CONTENT.into_response(),
                None => not_found(&moref("ContainerView", &mo_id)),
            }
        }
        ("PropertyCollector", "RetrievePropertiesEx") => {
            state.retrieve_calls.fetch_add(1, Ordering::SeqCst);
            retrieve_properties(&state, &body)
        }
        ("PropertyCollector", "ContinueRetrievePropertiesEx") => {
            state.continue_calls.fetch_add(1, Ordering::SeqCst);
            let token = body["token"].as_str().unwrap_or_default().to_string();
            let pending = state.pages.lock().unwrap().remove(&token);
            match pending {
                Some(mut rest) => {
                    let objects = rest.pop_front().unwrap_or_default();
                    page_response(&state, objects, rest)
                }
                None => fault("InvalidArgument", json!({"invalidProperty": "token"})),
            }
        }
        ("VcenterVStorageObjectManager", "ListVStorageObject") => {
            let ds = body["datastore"]["value"].as_str().unwrap_or_default();
            if state.inventory.faulty_datastores.iter().any(|f| f == ds) {
                return fault("InvalidDatastore", json!({"datastore": body["datastore"].clone()}));
            }
            let ids: Vec<Value> = state
                .inventory
                .disks
                .iter()
                .filter(|(owner, _)| owner == ds)
                .map(|(_, disk)| disk["config"]["id"].clone())
                .collect();
            Json(Value::Array(ids)).into_response()
        }
        ("VcenterVStorageObjectManager", "RetrieveVStorageObject") => {
            let ds = body["datastore"]["value"].as_str().unwrap_or_default();
            let id = body["id"]["id"].as_str().unwrap_or_default();
            state
                .inventory
                .disks
                .iter()
                .find(|(owner, disk)| owner == ds && disk["config"]["id"]["id"] == id)
                .map(|(_, disk)| Json(disk.clone()).into_response())
                .unwrap_or_else(|| fault("NotFound", json!({})))
        }
        _ => fault("MethodNotFound", json!({"method": member})),
    }
}

fn login(state: &MockState, body: &Value) -> Response {
    if body["userName"] != USERNAME || body["password"] != PASSWORD {
        return fault("InvalidLogin", json!({}));
    }
    state.logins.fetch_add(1, Ordering::SeqCst);
    let token = state.next_id("session");
    state.sessions.lock().unwrap().insert(token.clone());

    let mut response = Json(json!({
        "_typeName": "UserSession",
        "key": token,
        "userName": format!("VSPHERE.LOCAL\\{}", USERNAME.split('@').next().unwrap_or_default()),
        "fullName": "Administrator vsphere.local",
        "loginTime": "2024-05-01T08:00:00Z"
    }))
    .into_response();
    response
        .headers_mut()
        .insert(SESSION_HEADER, HeaderValue::from_str(&token).unwrap());
    response
}

fn kind_matches(kind: &str, wanted: &str) -> bool {
    kind == wanted || (wanted == "DistributedVirtualSwitch" && kind == "VmwareDistributedVirtualSwitch")
}

fn create_container_view(state: &MockState, body: &Value) -> Response {
    let container = body["container"]["value"].as_str().unwrap_or_default();
    let wanted = body["type"][0].as_str().unwrap_or_default();
    let inventory = &state.inventory;

    if container != ROOT_FOLDER && inventory.find("Datacenter", container).is_none() {
        return not_found(&body["container"]);
    }

    let refs: Vec<Value> = inventory
        .objects
        .iter()
        .filter(|o| kind_matches(&o.kind, wanted))
        .filter(|o| container == ROOT_FOLDER || o.datacenter.as_deref() == Some(container))
        .map(|o| moref(&o.kind, &o.id))
        .collect();

    state.views_created.fetch_add(1, Ordering::SeqCst);
    let view_id = state.next_id("view");
    state.views.lock().unwrap().insert(view_id.clone(), refs);
    Json(moref("ContainerView", &view_id)).into_response()
}

fn retrieve_properties(state: &MockState, body: &Value) -> Response {
    let spec = &body["specSet"][0];
    let mut paths_by_type: HashMap<String, Vec<String>> = HashMap::new();
    for prop in spec["propSet"].as_array().cloned().unwrap_or_default() {
        let kind = prop["type"].as_str().unwrap_or_default().to_string();
        let paths: Vec<String> = prop["pathSet"]
            .as_array()
            .map(|ps| ps.iter().filter_map(|p| p.as_str().map(str::to_string)).collect())
            .unwrap_or_default();
        paths_by_type.insert(kind, paths);
    }

    let mut objects = Vec::new();
    for object_spec in spec["objectSet"].as_array().cloned().unwrap_or_default() {
        let obj = &object_spec["obj"];
        let kind = obj["type"].as_str().unwrap_or_default();
        let id = obj["value"].as_str().unwrap_or_default();
        let Some(found) = state.inventory.find(kind, id) else {
            return not_found(obj);
        };

        let paths = paths_by_type.get(kind).cloned().unwrap_or_default();
        let prop_set: Vec<Value> = paths
            .iter()
            .filter_map(|p| {
                found.props.get(p).map(|v| {
                    json!({"_typeName": "DynamicProperty", "name": p, "val": v})
                })
            })
            .collect();
        let missing_set: Vec<Value> = paths
            .iter()
            .filter(|p| !found.props.contains_key(*p))
            .map(|p| {
                json!({
                    "_typeName": "MissingProperty",
                    "path": p,
                    "fault": {"_typeName": "LocalizedMethodFault"}
                })
            })
            .collect();

        objects.push(json!({
            "_typeName": "ObjectContent",
            "obj": moref(kind, id),
            "propSet": prop_set,
            "missingSet": missing_set
        }));
    }

    let page_size = body["options"]["maxObjects"]
        .as_u64()
        .map_or(usize::MAX, |n| n as usize);
    first_page(state, objects, page_size)
}

fn first_page(state: &MockState, objects: Vec<Value>, page_size: usize) -> Response {
    let mut chunks: VecDeque<Vec<Value>> = if objects.len() <= page_size {
        VecDeque::from([objects])
    } else {
        objects.chunks(page_size.max(1)).map(<[Value]>::to_vec).collect()
    };
    let first = chunks.pop_front().unwrap_or_default();
    page_response(state, first, chunks)
}

fn page_response(state: &MockState, objects: Vec<Value>, rest: VecDeque<Vec<Value>>) -> Response {
    let mut result = json!({"_typeName": "RetrieveResult", "objects": objects});
    if !rest.is_empty() {
        let token = state.next_id("token");
        state.pages.lock().unwrap().insert(token.clone(), rest);
        result["token"] = json!(token);
    }
    Json(result).into_response()
}

async fn rest_login(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    let expected = format!("{}:{}", USERNAME, PASSWORD);
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Basic "))
        .and_then(|encoded| base64::engine::general_purpose::STANDARD.decode(encoded).ok())
        .map_or(false, |decoded| decoded == expected.as_bytes());
    if !authorized {
        return rest_unauthenticated();
    }

    state.rest_logins.fetch_add(1, Ordering::SeqCst);
    let token = state.next_id("rest");
    state.rest_sessions.lock().unwrap().insert(token.clone());
    Json(Value::String(token)).into_response()
}

async fn rest_logout(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Some(token) = headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok()) {
        state.rest_sessions.lock().unwrap().remove(token);
    }
    StatusCode::NO_CONTENT.into_response()
}

fn rest_unauthenticated() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error_type": "UNAUTHENTICATED", "messages": []})),
    )
        .into_response()
}

fn has_rest_session(state: &MockState, headers: &HeaderMap) -> bool {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |token| state.rest_sessions.lock().unwrap().contains(token))
}

async fn list_tags(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if !has_rest_session(&state, &headers) {
        return rest_unauthenticated();
    }
    let ids: Vec<Value> = state.inventory.tags.iter().map(|t| t["id"].clone()).collect();
    Json(Value::Array(ids)).into_response()
}

async fn get_tag(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !has_rest_session(&state, &headers) {
        return rest_unauthenticated();
    }
    match state.inventory.tags.iter().find(|t| t["id"] == id.as_str()) {
        Some(tag) => Json(tag.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"error_type": "NOT_FOUND"}))).into_response(),
    }
}

async fn get_category(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !has_rest_session(&state, &headers) {
        return rest_unauthenticated();
    }
    match state.inventory.categories.iter().find(|c| c["id"] == id.as_str()) {
        Some(category) => Json(category.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"error_type": "NOT_FOUND"}))).into_response(),
    }
}

async fn tag_association(
    State(state): State<Arc<MockState>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !has_rest_session(&state, &headers) {
        return rest_unauthenticated();
    }
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let attachments = &state.inventory.attachments;

    match query.get("action").map(String::as_str) {
        Some("list-attached-tags-on-objects") => {
            let result: Vec<Value> = body["object_ids"]
                .as_array()
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .map(|object| {
                    let tag_ids: Vec<&str> = attachments
                        .iter()
                        .filter(|(_, kind, id)| object["type"] == kind.as_str() && object["id"] == id.as_str())
                        .map(|(tag, _, _)| tag.as_str())
                        .collect();
                    json!({"object_id": object, "tag_ids": tag_ids})
                })
                .collect();
            Json(Value::Array(result)).into_response()
        }
        Some("list-attached-objects-on-tags") => {
            let result: Vec<Value> = body["tag_ids"]
                .as_array()
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .map(|tag_id| {
                    let objects: Vec<Value> = attachments
                        .iter()
                        .filter(|(tag, _, _)| tag_id == tag.as_str())
                        .map(|(_, kind, id)| json!({"type": kind, "id": id}))
                        .collect();
                    json!({"tag_id": tag_id, "object_ids": objects})
                })
                .collect();
            Json(Value::Array(result)).into_response()
        }
        _ => (StatusCode::BAD_REQUEST, Json(json!({"error_type": "INVALID_ARGUMENT"}))).into_response(),
    }
}
